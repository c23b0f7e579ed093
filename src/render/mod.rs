//! Diagram renderer — model to PlantUML source.
//!
//! DESIGN
//! ======
//! Pure and total: every model renders, however sparse, and the same model
//! always renders to the same text. Dispatch is a table from [`DiagramType`]
//! to the renderer for that shape; each renderer returns `None` when handed a
//! model of another shape, which becomes a `'` comment placeholder.
//!
//! Names are emitted verbatim when they are plain identifiers and quoted
//! otherwise. References to undeclared names are written as-is.

mod class;
mod sequence;
mod usecase;

use crate::model::{DiagramType, Model};

pub const START: &str = "@startuml";
pub const END: &str = "@enduml";

type Renderer = fn(&Model) -> Option<Vec<String>>;

const RENDERERS: [(DiagramType, Renderer); 3] = [
    (DiagramType::Class, class_diagram),
    (DiagramType::UseCase, usecase_diagram),
    (DiagramType::Sequence, sequence_diagram),
];

fn class_diagram(model: &Model) -> Option<Vec<String>> {
    if let Model::Class(m) = model { Some(class::render(m)) } else { None }
}

fn usecase_diagram(model: &Model) -> Option<Vec<String>> {
    if let Model::UseCase(m) = model { Some(usecase::render(m)) } else { None }
}

fn sequence_diagram(model: &Model) -> Option<Vec<String>> {
    if let Model::Sequence(m) = model { Some(sequence::render(m)) } else { None }
}

/// Render `model` as the diagram named by `diagram_type`.
///
/// An unrecognized type name or a model of another shape yields a diagram
/// holding a single comment line.
#[must_use]
pub fn render(model: &Model, diagram_type: &str) -> String {
    let Some(requested) = DiagramType::parse(diagram_type) else {
        return wrap(vec![format!("' unsupported diagram type: {}", one_line(diagram_type.trim()))]);
    };
    let body = RENDERERS
        .iter()
        .find(|(kind, _)| *kind == requested)
        .and_then(|(_, renderer)| renderer(model));
    match body {
        Some(lines) => wrap(lines),
        None => wrap(vec![format!("' {} model cannot be rendered as a {requested} diagram", model.diagram_type())]),
    }
}

/// Render a model as its own diagram type.
#[must_use]
pub fn render_model(model: &Model) -> String {
    render(model, model.diagram_type().as_str())
}

fn wrap(body: Vec<String>) -> String {
    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(START.to_owned());
    lines.extend(body);
    lines.push(END.to_owned());
    lines.join("\n")
}

// =============================================================================
// NAMES
// =============================================================================

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The name as written in diagram source: bare when it is an identifier.
fn quoted(name: &str) -> String {
    let name = one_line(name.trim());
    if is_identifier(&name) { name } else { format!("\"{}\"", name.replace('"', "'")) }
}

/// Characters outside `[A-Za-z0-9_]` become `_`.
fn sanitize(name: &str) -> String {
    one_line(name.trim())
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Identifier-safe alias for a declared name.
fn alias(name: &str) -> String {
    let alias = sanitize(name);
    if alias.is_empty() || alias.starts_with(|c: char| c.is_ascii_digit()) { format!("_{alias}") } else { alias }
}

/// Collapse line breaks so one value stays on one diagram line.
fn one_line(text: &str) -> String {
    text.split(['\r', '\n']).filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ")
}

/// ` : label` when the label has any content.
fn label_clause(label: &str) -> String {
    let label = one_line(label.trim());
    if label.is_empty() { String::new() } else { format!(" : {label}") }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
