//! Diagram models — the structured form of class, use-case and sequence diagrams.
//!
//! DESIGN
//! ======
//! One struct per diagram shape, wrapped by [`Model`]. Field names match the
//! JSON wire format exchanged with the completion service (`from`, `to`,
//! `type`, `use_cases`). Decoding is lenient because payloads come from a
//! language model: missing optional containers default to empty, list items of
//! the wrong scalar type are coerced to strings, and unknown enum tags degrade
//! instead of failing. See `lenient.rs`.
//!
//! Ordering of classes, use cases and messages is significant and is never
//! changed by this module.

mod lenient;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// =============================================================================
// DIAGRAM TYPE
// =============================================================================

/// Discriminator selecting one of the three model shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramType {
    Class,
    UseCase,
    Sequence,
}

impl DiagramType {
    pub const ALL: [Self; 3] = [Self::Class, Self::UseCase, Self::Sequence];

    /// Parse a caller-supplied diagram type. Case-insensitive; also accepts
    /// `use-case`, `use_case` and `use case`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "class" => Some(Self::Class),
            "usecase" | "use-case" | "use_case" | "use case" => Some(Self::UseCase),
            "sequence" => Some(Self::Sequence),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::UseCase => "usecase",
            Self::Sequence => "sequence",
        }
    }
}

impl fmt::Display for DiagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// MODEL
// =============================================================================

/// A diagram model of any supported shape.
///
/// Serializes as the bare shape (no tag); the diagram type travels separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Model {
    Class(ClassModel),
    UseCase(UseCaseModel),
    Sequence(SequenceModel),
}

impl Model {
    /// The empty model for a diagram type.
    #[must_use]
    pub fn empty(diagram_type: DiagramType) -> Self {
        match diagram_type {
            DiagramType::Class => Self::Class(ClassModel::default()),
            DiagramType::UseCase => Self::UseCase(UseCaseModel::default()),
            DiagramType::Sequence => Self::Sequence(SequenceModel::default()),
        }
    }

    /// Decode a JSON payload as the model shape for `diagram_type`.
    ///
    /// # Errors
    ///
    /// Returns the serde error when the payload is not an object or a required
    /// top-level container cannot be decoded at all.
    pub fn from_value(diagram_type: DiagramType, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match diagram_type {
            DiagramType::Class => Self::Class(serde_json::from_value(value)?),
            DiagramType::UseCase => Self::UseCase(serde_json::from_value(value)?),
            DiagramType::Sequence => Self::Sequence(serde_json::from_value(value)?),
        })
    }

    #[must_use]
    pub fn diagram_type(&self) -> DiagramType {
        match self {
            Self::Class(_) => DiagramType::Class,
            Self::UseCase(_) => DiagramType::UseCase,
            Self::Sequence(_) => DiagramType::Sequence,
        }
    }

    /// Number of declared entities (classes, actors + use cases, participants).
    #[must_use]
    pub fn entity_count(&self) -> usize {
        match self {
            Self::Class(m) => m.classes.len(),
            Self::UseCase(m) => m.actors.len() + m.use_cases.len(),
            Self::Sequence(m) => m.participants.len(),
        }
    }

    /// Pretty JSON for prompts and CLI output.
    #[must_use]
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_owned())
    }
}

impl From<ClassModel> for Model {
    fn from(model: ClassModel) -> Self {
        Self::Class(model)
    }
}

impl From<UseCaseModel> for Model {
    fn from(model: UseCaseModel) -> Self {
        Self::UseCase(model)
    }
}

impl From<SequenceModel> for Model {
    fn from(model: SequenceModel) -> Self {
        Self::Sequence(model)
    }
}

// =============================================================================
// CLASS DIAGRAM
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassModel {
    #[serde(default, deserialize_with = "lenient::seq")]
    pub classes: Vec<ClassDef>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub relationships: Vec<Relationship>,
}

impl ClassModel {
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Return the class called `name`, appending an empty one if absent.
    pub fn ensure_class(&mut self, name: &str) -> &mut ClassDef {
        let index = match self.classes.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.classes.push(ClassDef::named(name));
                self.classes.len() - 1
            }
        };
        &mut self.classes[index]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub attributes: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub methods: Vec<String>,
}

impl ClassDef {
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self { name: name.to_owned(), attributes: Vec::new(), methods: Vec::new() }
    }

    /// Append an attribute unless an identical one is already listed.
    pub fn add_attribute(&mut self, attribute: &str) {
        if !self.attributes.iter().any(|a| a == attribute) {
            self.attributes.push(attribute.to_owned());
        }
    }

    /// Append a method unless an identical one is already listed.
    pub fn add_method(&mut self, method: &str) {
        if !self.methods.iter().any(|m| m == method) {
            self.methods.push(method.to_owned());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(deserialize_with = "lenient::string")]
    pub from: String,
    #[serde(deserialize_with = "lenient::string")]
    pub to: String,
    #[serde(rename = "type", default)]
    pub kind: RelationshipKind,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub label: String,
}

impl Relationship {
    #[must_use]
    pub fn new(from: &str, to: &str, kind: RelationshipKind, label: &str) -> Self {
        Self { from: from.to_owned(), to: to.to_owned(), kind, label: label.to_owned() }
    }
}

/// Relationship type between two classes.
///
/// Unknown tags are kept verbatim in [`RelationshipKind::Other`] and render as
/// a plain arrow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    #[default]
    Association,
    Inheritance,
    Composition,
    Aggregation,
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
    Other(String),
}

impl RelationshipKind {
    /// Parse a type tag. Case-insensitive; `_` and spaces are read as `-`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c.to_ascii_lowercase() })
            .collect();
        match normalized.as_str() {
            "" | "association" => Self::Association,
            "inheritance" | "generalization" => Self::Inheritance,
            "composition" => Self::Composition,
            "aggregation" => Self::Aggregation,
            "one-to-one" => Self::OneToOne,
            "one-to-many" => Self::OneToMany,
            "many-to-one" => Self::ManyToOne,
            "many-to-many" => Self::ManyToMany,
            _ => Self::Other(raw.trim().to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Association => "association",
            Self::Inheritance => "inheritance",
            Self::Composition => "composition",
            Self::Aggregation => "aggregation",
            Self::OneToOne => "one-to-one",
            Self::OneToMany => "one-to-many",
            Self::ManyToOne => "many-to-one",
            Self::ManyToMany => "many-to-many",
            Self::Other(raw) => raw,
        }
    }

    /// Cardinality markers `(from, to)` for the multiplicity kinds.
    #[must_use]
    pub fn cardinalities(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::OneToOne => Some(("1", "1")),
            Self::OneToMany => Some(("1", "*")),
            Self::ManyToOne => Some(("*", "1")),
            Self::ManyToMany => Some(("*", "*")),
            _ => None,
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RelationshipKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RelationshipKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or_else(Self::default, |s| Self::parse(&s)))
    }
}

// =============================================================================
// USE CASE DIAGRAM
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseCaseModel {
    #[serde(default, deserialize_with = "lenient::strings")]
    pub actors: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub use_cases: Vec<String>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub associations: Vec<Association>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub includes: Vec<UseCaseLink>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub extends: Vec<UseCaseLink>,
}

/// An actor taking part in a use case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    #[serde(deserialize_with = "lenient::string")]
    pub actor: String,
    #[serde(deserialize_with = "lenient::string")]
    pub use_case: String,
}

/// An `include` or `extend` edge between two use cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseCaseLink {
    #[serde(deserialize_with = "lenient::string")]
    pub from: String,
    #[serde(deserialize_with = "lenient::string")]
    pub to: String,
}

// =============================================================================
// SEQUENCE DIAGRAM
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceModel {
    #[serde(default, deserialize_with = "lenient::strings")]
    pub participants: Vec<String>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub messages: Vec<SequenceMessage>,
    #[serde(default, deserialize_with = "lenient::seq")]
    pub activations: Vec<Activation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceMessage {
    #[serde(deserialize_with = "lenient::string")]
    pub from: String,
    #[serde(deserialize_with = "lenient::string")]
    pub to: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
}

/// Arrow semantics of a sequence message. Unknown tags read as `sync`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Sync,
    Async,
    Return,
    Create,
    Destroy,
}

impl MessageKind {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "async" | "asynchronous" => Self::Async,
            "return" | "reply" | "response" => Self::Return,
            "create" => Self::Create,
            "destroy" | "delete" => Self::Destroy,
            _ => Self::Sync,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Async => "async",
            Self::Return => "return",
            Self::Create => "create",
            Self::Destroy => "destroy",
        }
    }
}

impl<'de> Deserialize<'de> for MessageKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or_else(Self::default, |s| Self::parse(&s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    #[serde(deserialize_with = "lenient::string")]
    pub participant: String,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub deactivate: bool,
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
