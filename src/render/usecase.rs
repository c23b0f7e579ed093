//! Use-case diagrams.

use std::collections::{HashMap, HashSet};

use super::{alias, one_line, sanitize};
use crate::model::UseCaseModel;

/// Name of the group holding the use cases; no actor or use case may take it.
const BOUNDARY: &str = "System";

pub(super) fn render(model: &UseCaseModel) -> Vec<String> {
    let mut ids = Ids::default();
    let mut lines = vec!["left to right direction".to_owned()];

    for actor in &model.actors {
        if let Some(id) = ids.declare_actor(actor) {
            lines.push(format!("actor \"{}\" as {id}", display(actor)));
        }
    }

    if !model.use_cases.is_empty() {
        lines.push(format!("rectangle {BOUNDARY} {{"));
        for use_case in &model.use_cases {
            if let Some(id) = ids.declare_use_case(use_case) {
                lines.push(format!("  usecase \"{}\" as {id}", display(use_case)));
            }
        }
        lines.push("}".to_owned());
    }

    for association in &model.associations {
        lines.push(format!("{} --> {}", ids.actor(&association.actor), ids.use_case(&association.use_case)));
    }
    for include in &model.includes {
        lines.push(format!("{} ..> {} : <<include>>", ids.use_case(&include.from), ids.use_case(&include.to)));
    }
    for extend in &model.extends {
        lines.push(format!("{} ..> {} : <<extend>>", ids.use_case(&extend.from), ids.use_case(&extend.to)));
    }
    lines
}

/// `UC_` plus the name with spaces, hyphens and other non-identifier
/// characters replaced by `_`.
fn use_case_id(name: &str) -> String {
    format!("UC_{}", sanitize(name))
}

fn display(name: &str) -> String {
    one_line(name.trim()).replace('"', "'")
}

// =============================================================================
// IDS
// =============================================================================

/// Diagram ids for declared names. Distinct names that sanitize to the same
/// id get `_2`, `_3`, ... in declaration order; edges look names up here and
/// fall back to the plain id for undeclared names.
#[derive(Default)]
struct Ids {
    actors: HashMap<String, String>,
    use_cases: HashMap<String, String>,
    taken: HashSet<String>,
}

impl Ids {
    /// The new id, or `None` when `name` was already declared.
    fn declare_actor(&mut self, name: &str) -> Option<String> {
        if self.actors.contains_key(name) {
            return None;
        }
        let id = self.claim(alias(name));
        self.actors.insert(name.to_owned(), id.clone());
        Some(id)
    }

    fn declare_use_case(&mut self, name: &str) -> Option<String> {
        if self.use_cases.contains_key(name) {
            return None;
        }
        let id = self.claim(use_case_id(name));
        self.use_cases.insert(name.to_owned(), id.clone());
        Some(id)
    }

    fn claim(&mut self, base: String) -> String {
        let mut id = base.clone();
        let mut n = 2;
        while id == BOUNDARY || self.taken.contains(&id) {
            id = format!("{base}_{n}");
            n += 1;
        }
        self.taken.insert(id.clone());
        id
    }

    fn actor(&self, name: &str) -> String {
        self.actors.get(name).cloned().unwrap_or_else(|| alias(name))
    }

    fn use_case(&self, name: &str) -> String {
        self.use_cases.get(name).cloned().unwrap_or_else(|| use_case_id(name))
    }
}
