//! Class diagrams.

use super::{label_clause, one_line, quoted};
use crate::model::{ClassDef, ClassModel, Relationship, RelationshipKind};

const VISIBILITY: [char; 4] = ['+', '-', '#', '~'];

pub(super) fn render(model: &ClassModel) -> Vec<String> {
    let mut lines = Vec::new();
    for class in &model.classes {
        class_block(class, &mut lines);
    }
    lines.extend(model.relationships.iter().map(relationship));
    lines
}

fn class_block(class: &ClassDef, lines: &mut Vec<String>) {
    lines.push(format!("class {} {{", quoted(&class.name)));
    for attribute in &class.attributes {
        lines.push(format!("  {}", member(attribute)));
    }
    if !class.methods.is_empty() {
        lines.push("  --".to_owned());
        for method in &class.methods {
            let method = member(method);
            if method.ends_with(')') {
                lines.push(format!("  {method}"));
            } else {
                lines.push(format!("  {method}()"));
            }
        }
    }
    lines.push("}".to_owned());
}

/// Public unless the member already carries a visibility marker.
fn member(raw: &str) -> String {
    let text = one_line(raw.trim());
    if text.starts_with(VISIBILITY) { text } else { format!("+{text}") }
}

fn relationship(rel: &Relationship) -> String {
    let (from, to) = (quoted(&rel.from), quoted(&rel.to));
    let label = label_clause(&rel.label);
    match &rel.kind {
        RelationshipKind::Inheritance => format!("{to} <|-- {from}"),
        RelationshipKind::Composition => format!("{from} *-- {to}{label}"),
        RelationshipKind::Aggregation => format!("{from} o-- {to}{label}"),
        kind => match kind.cardinalities() {
            Some((near, far)) => format!("{from} \"{near}\" --> \"{far}\" {to}{label}"),
            None => format!("{from} --> {to}{label}"),
        },
    }
}
