//! Sequence diagrams.
//!
//! Participants are declared as `actor`, `database` or `participant` by the
//! words in their name. Data-store words win over people words, so
//! `UserRepository` is a database.

use super::{alias, is_identifier, label_clause, one_line};
use crate::model::{MessageKind, SequenceModel};

const PEOPLE: &[&str] = &[
    "user", "users", "customer", "customers", "admin", "administrator", "actor", "client", "member", "person",
    "student", "teacher", "employee", "manager", "guest", "visitor", "librarian", "patient", "doctor", "buyer",
    "seller", "owner", "operator", "driver", "passenger",
];

const DATA_STORES: &[&str] =
    &["database", "db", "repository", "repo", "store", "storage", "cache", "datastore", "persistence", "dao"];

pub(super) fn render(model: &SequenceModel) -> Vec<String> {
    let mut lines: Vec<String> = model.participants.iter().map(|p| declaration(p)).collect();

    for message in &model.messages {
        let (from, to) = (reference(&message.from), reference(&message.to));
        let label = label_clause(&message.message);
        lines.push(match message.kind {
            MessageKind::Sync => format!("{from} -> {to}{label}"),
            MessageKind::Async => format!("{from} ->> {to}{label}"),
            MessageKind::Return => format!("{from} --> {to}{label}"),
            MessageKind::Create => format!("{from} -> {to} **{label}"),
            MessageKind::Destroy => format!("{from} -> {to} !!{label}"),
        });
    }

    for activation in &model.activations {
        let verb = if activation.deactivate { "deactivate" } else { "activate" };
        lines.push(format!("{verb} {}", reference(&activation.participant)));
    }
    lines
}

fn declaration(name: &str) -> String {
    let keyword = keyword(name);
    let display = one_line(name.trim());
    if is_identifier(&display) {
        format!("{keyword} {display}")
    } else {
        format!("{keyword} \"{}\" as {}", display.replace('"', "'"), alias(name))
    }
}

/// How a participant is referred to after its declaration.
fn reference(name: &str) -> String {
    let display = one_line(name.trim());
    if is_identifier(&display) { display } else { alias(name) }
}

fn keyword(name: &str) -> &'static str {
    let words = words(name);
    if words.iter().any(|w| DATA_STORES.contains(&w.as_str())) {
        "database"
    } else if words.iter().any(|w| PEOPLE.contains(&w.as_str())) {
        "actor"
    } else {
        "participant"
    }
}

/// Lowercase words, split on non-alphanumerics and camel-case humps.
fn words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    for part in name.split(|c: char| !c.is_alphanumeric()).filter(|p| !p.is_empty()) {
        let mut current = String::new();
        let mut previous_lower = false;
        for c in part.chars() {
            if c.is_uppercase() && previous_lower && !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            previous_lower = c.is_lowercase() || c.is_ascii_digit();
            current.push(c);
        }
        words.push(current.to_lowercase());
    }
    words
}
