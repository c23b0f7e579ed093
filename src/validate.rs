//! Compatibility validator — does a payload have the top-level shape of its
//! diagram type?
//!
//! Only key presence and array container type are checked. Everything inside
//! the containers is left to the lenient decoder in `model`.

use serde_json::Value;

use crate::model::DiagramType;

/// Top-level keys that must hold arrays, per diagram type.
#[must_use]
pub fn required_keys(diagram_type: DiagramType) -> &'static [&'static str] {
    match diagram_type {
        DiagramType::Class => &["classes", "relationships"],
        DiagramType::UseCase => &["actors", "use_cases"],
        DiagramType::Sequence => &["participants", "messages"],
    }
}

#[must_use]
pub fn validate(value: &Value, diagram_type: DiagramType) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };
    required_keys(diagram_type)
        .iter()
        .all(|key| object.get(*key).is_some_and(Value::is_array))
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
