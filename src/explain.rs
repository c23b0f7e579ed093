//! Model explanation — a short HTML summary shown next to the diagram.

use std::fmt::Write as _;

use crate::model::{ClassModel, Model, SequenceModel, UseCaseModel};

/// Summarize `model` as an HTML fragment. Every model text is escaped.
#[must_use]
pub fn explain(model: &Model) -> String {
    match model {
        Model::Class(m) => class(m),
        Model::UseCase(m) => usecase(m),
        Model::Sequence(m) => sequence(m),
    }
}

fn class(model: &ClassModel) -> String {
    if model.classes.is_empty() {
        return nothing_found("classes");
    }
    let mut out = String::from("<h3>Diagram Overview</h3>\n<h4>Classes:</h4>\n<ul>\n");
    for class in &model.classes {
        let attributes = if class.attributes.is_empty() {
            "<i>no attributes</i>".to_owned()
        } else {
            escape(&class.attributes.join(", "))
        };
        let _ = writeln!(out, "<li><strong>{}</strong> has the attributes: {attributes}</li>", escape(&class.name));
    }
    out.push_str("</ul>");

    if !model.relationships.is_empty() {
        out.push_str("\n<h4>Relationships:</h4>\n<ul>\n");
        for rel in &model.relationships {
            let label = if rel.label.is_empty() { "relates to" } else { rel.label.as_str() };
            let _ = writeln!(
                out,
                "<li><strong>{}</strong> <em>{}</em> <strong>{}</strong> (<code>{}</code>)</li>",
                escape(&rel.from),
                escape(label),
                escape(&rel.to),
                escape(rel.kind.as_str()),
            );
        }
        out.push_str("</ul>");
    }
    out
}

fn usecase(model: &UseCaseModel) -> String {
    if model.actors.is_empty() && model.use_cases.is_empty() {
        return nothing_found("actors or use cases");
    }
    let mut out = String::from("<h3>Diagram Overview</h3>\n<h4>Actors:</h4>\n<ul>\n");
    for actor in &model.actors {
        let goals: Vec<&str> = model
            .associations
            .iter()
            .filter(|a| a.actor == *actor)
            .map(|a| a.use_case.as_str())
            .collect();
        let goals = if goals.is_empty() { "<i>no use cases</i>".to_owned() } else { escape(&goals.join(", ")) };
        let _ = writeln!(out, "<li><strong>{}</strong> can: {goals}</li>", escape(actor));
    }
    out.push_str("</ul>\n<h4>Use cases:</h4>\n<ul>\n");
    for use_case in &model.use_cases {
        let _ = writeln!(out, "<li>{}</li>", escape(use_case));
    }
    out.push_str("</ul>");
    out
}

fn sequence(model: &SequenceModel) -> String {
    if model.messages.is_empty() {
        return nothing_found("messages");
    }
    let mut out = format!(
        "<h3>Diagram Overview</h3>\n<p>Participants: {}</p>\n<h4>Messages:</h4>\n<ol>\n",
        escape(&model.participants.join(", "))
    );
    for message in &model.messages {
        let _ = writeln!(
            out,
            "<li><strong>{}</strong> to <strong>{}</strong>: {} (<code>{}</code>)</li>",
            escape(&message.from),
            escape(&message.to),
            escape(&message.message),
            message.kind.as_str(),
        );
    }
    out.push_str("</ol>");
    out
}

fn nothing_found(what: &str) -> String {
    format!("<p>No {what} were identified in the model.</p>")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "explain_test.rs"]
mod tests;
