//! Heuristic extractor — a rule-based draft class model from free text.
//!
//! DESIGN
//! ======
//! Text is read line by line. A line shaped like `Name: a, b` (or `Name - a, b`)
//! with short items lists attributes directly; every other line is split into
//! sentences and tagged (see `tagger`). Per sentence:
//!
//! 1. capitalized noun phrases register classes, in first-seen order;
//! 2. `X has/contains/includes a, b and c` attaches lowercase items as attributes;
//! 3. `X can/should/must verb [and verb]` attaches `verb()` methods;
//! 4. a verb between two capitalized noun phrases emits a relationship, typed
//!    by the verb lemma (inheritance / composition vocabularies) and refined by
//!    multiplicity patterns or the plural form of the object.
//!
//! Relationships are de-duplicated on `(from, to, type)` at the end.
//!
//! TRADE-OFFS
//! ==========
//! Best-effort by construction. The draft is context for the completion
//! service and the fallback when it fails, so the rules favor precision over
//! recall: lowercase nouns never become classes, and capitalized items in an
//! attribute list are left to relationships instead of duplicating them as
//! attributes. No placeholder class is produced for text with no classes.

pub mod tagger;

use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::model::{ClassModel, DiagramType, Model, Relationship, RelationshipKind};
use tagger::{Tag, Token};

const ATTRIBUTE_VERBS: &[&str] = &["have", "contain", "include"];
const INHERITANCE_VERBS: &[&str] = &["be", "inherit", "extend", "derive", "specialize", "subclass", "implement"];
const COMPOSITION_VERBS: &[&str] = &["contain", "include", "have", "comprise", "consist", "compose", "hold"];
const AUXILIARIES: &[&str] = &["be", "have", "do"];

/// Quantifier pairs checked in order; the first match wins.
const MULTIPLICITY_PATTERNS: [(&str, &str); 5] =
    [("one", "many"), ("many", "one"), ("many", "many"), ("each", "multiple"), ("single", "multiple")];

/// Longest item, in words, that still reads as an attribute.
const MAX_ATTRIBUTE_WORDS: usize = 3;

static ATTRIBUTE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:[-*•]\s+)?(?:(?i:the|an|a)\s+)?([A-Z][\w]*(?:\s+[A-Z][\w]*)*)\s*(?::|\s[-–]\s)\s*(\S.*)$",
    )
    .expect("attribute line pattern is valid")
});

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Extract a draft class model from free text.
#[must_use]
pub fn extract(text: &str) -> ClassModel {
    let mut extractor = Extractor::default();
    for line in text.lines() {
        match classify(line) {
            Line::Attributes { name, items } => extractor.attribute_line(&name, &items),
            Line::Prose(prose) => {
                for sentence in tagger::sentences(prose) {
                    extractor.sentence(sentence);
                }
            }
        }
    }
    let model = extractor.finish();
    debug!(classes = model.classes.len(), relationships = model.relationships.len(), "extract: draft ready");
    model
}

/// Draft model for any diagram type. Only class diagrams have extraction
/// rules; the other shapes start empty.
#[must_use]
pub fn draft(text: &str, diagram_type: DiagramType) -> Model {
    match diagram_type {
        DiagramType::Class => Model::Class(extract(text)),
        other => Model::empty(other),
    }
}

enum Line<'a> {
    Attributes { name: String, items: Vec<String> },
    Prose(&'a str),
}

/// `Name: a, b; c` is an attribute list when every item is a short phrase.
/// Otherwise the line is prose; a label before a full sentence
/// (`Note: The Library has Books.`) is dropped.
fn classify(line: &str) -> Line<'_> {
    let Some(captures) = ATTRIBUTE_LINE.captures(line) else {
        return Line::Prose(line);
    };
    let (Some(name), Some(rest)) = (captures.get(1), captures.get(2)) else {
        return Line::Prose(line);
    };
    let items = attribute_items(rest.as_str());
    if items.iter().all(|item| item.split_whitespace().count() <= MAX_ATTRIBUTE_WORDS) {
        let name = name.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
        return Line::Attributes { name, items };
    }
    let rest = rest.as_str();
    if rest.starts_with(char::is_uppercase) { Line::Prose(rest) } else { Line::Prose(line) }
}

/// Split `a, b; and c.` into trimmed items.
fn attribute_items(list: &str) -> Vec<String> {
    list.split([',', ';'])
        .map(|item| {
            let item = item.trim().trim_end_matches('.').trim();
            item.strip_prefix("and ")
                .or_else(|| item.strip_prefix("or "))
                .unwrap_or(item)
                .trim()
                .to_owned()
        })
        .filter(|item| !item.is_empty())
        .collect()
}

// =============================================================================
// EXTRACTOR
// =============================================================================

/// A run of capitalized noun tokens naming one class.
struct Phrase {
    span: Range<usize>,
    name: String,
}

#[derive(Default)]
struct Extractor {
    model: ClassModel,
}

impl Extractor {
    fn attribute_line(&mut self, name: &str, items: &[String]) {
        let class = self.model.ensure_class(name);
        for item in items {
            class.add_attribute(item);
        }
    }

    fn sentence(&mut self, sentence: &str) {
        let tokens = tagger::tag(&tagger::tokenize(sentence));
        let phrases = class_phrases(&tokens);
        for phrase in &phrases {
            self.model.ensure_class(&phrase.name);
        }
        self.attributes(&tokens, &phrases);
        self.methods(&tokens, &phrases);
        self.relationships(sentence, &tokens, &phrases);
    }

    fn attributes(&mut self, tokens: &[Token], phrases: &[Phrase]) {
        for (v, token) in tokens.iter().enumerate() {
            if token.tag != Tag::Verb || !ATTRIBUTE_VERBS.contains(&token.lemma.as_str()) {
                continue;
            }
            let Some(subject) = subject_before(tokens, phrases, v) else {
                continue;
            };
            for item in object_list(tokens, v + 1, false) {
                if phrase_at(phrases, &item).is_some() {
                    continue;
                }
                let attribute = join_words(&tokens[item]);
                self.model.ensure_class(&subject.name).add_attribute(&attribute);
            }
        }
    }

    fn methods(&mut self, tokens: &[Token], phrases: &[Phrase]) {
        for (m, token) in tokens.iter().enumerate() {
            if token.tag != Tag::Modal {
                continue;
            }
            let Some(subject) = subject_before(tokens, phrases, m) else {
                continue;
            };
            let Some(first) = next_content(tokens, m + 1) else {
                continue;
            };
            if tokens[first].tag != Tag::Verb || AUXILIARIES.contains(&tokens[first].lemma.as_str()) {
                continue;
            }
            let mut verbs = vec![first];
            let mut j = first + 1;
            while j < tokens.len() && tokens[j].tag != Tag::Modal {
                if tokens[j].tag == Tag::Conjunction || tokens[j].is_punct(",") {
                    let next = next_content(tokens, j + 1).filter(|&k| tokens[k].tag != Tag::Conjunction);
                    if let Some(k) = next.filter(|&k| tokens[k].tag == Tag::Verb) {
                        verbs.push(k);
                        j = k;
                    }
                }
                j += 1;
            }
            let class = self.model.ensure_class(&subject.name);
            for v in verbs {
                class.add_method(&format!("{}()", tokens[v].lemma));
            }
        }
    }

    fn relationships(&mut self, sentence: &str, tokens: &[Token], phrases: &[Phrase]) {
        for (v, token) in tokens.iter().enumerate() {
            if token.tag != Tag::Verb || token.lemma == "do" {
                continue;
            }
            let Some(subject) = subject_before(tokens, phrases, v) else {
                continue;
            };
            let lemma = token.lemma.as_str();
            for item in object_list(tokens, v + 1, true) {
                let Some(object) = phrase_at(phrases, &item) else {
                    continue;
                };
                let mut kind = if INHERITANCE_VERBS.contains(&lemma) {
                    RelationshipKind::Inheritance
                } else if COMPOSITION_VERBS.contains(&lemma) {
                    RelationshipKind::Composition
                } else {
                    RelationshipKind::Association
                };
                let label = if kind == RelationshipKind::Association { lemma } else { "" };
                if kind == RelationshipKind::Association {
                    if let Some(multiplicity) = multiplicity(sentence, &subject.name, &object.name) {
                        kind = multiplicity;
                    } else if tagger::is_plural(&tokens[object.span.end - 1].lower) {
                        kind = RelationshipKind::OneToMany;
                    }
                }
                self.model
                    .relationships
                    .push(Relationship::new(&subject.name, &object.name, kind, label));
            }
        }
    }

    fn finish(mut self) -> ClassModel {
        let mut seen = HashSet::new();
        self.model
            .relationships
            .retain(|r| seen.insert((r.from.clone(), r.to.clone(), r.kind.clone())));
        for relationship in &mut self.model.relationships {
            if matches!(relationship.kind, RelationshipKind::Inheritance | RelationshipKind::Composition) {
                relationship.label.clear();
            }
        }
        self.model
    }
}

// =============================================================================
// PHRASES
// =============================================================================

fn class_phrases(tokens: &[Token]) -> Vec<Phrase> {
    let mut phrases = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].tag != Tag::ProperNoun {
            i += 1;
            continue;
        }
        let start = i;
        while i < tokens.len() && tokens[i].tag == Tag::ProperNoun {
            i += 1;
        }
        phrases.push(Phrase { span: start..i, name: join_words(&tokens[start..i]) });
    }
    phrases
}

fn phrase_at<'a>(phrases: &'a [Phrase], span: &Range<usize>) -> Option<&'a Phrase> {
    phrases.iter().find(|p| p.span == *span)
}

/// The class phrase governing the word at `i`: the nearest phrase to the left
/// with only adverbs, modals or auxiliaries in between.
fn subject_before<'a>(tokens: &[Token], phrases: &'a [Phrase], i: usize) -> Option<&'a Phrase> {
    let j = tokens[..i].iter().rposition(|t| {
        let auxiliary = t.tag == Tag::Verb && AUXILIARIES.contains(&t.lemma.as_str());
        !(matches!(t.tag, Tag::Adverb | Tag::Modal) || auxiliary)
    })?;
    phrases.iter().find(|p| p.span.end == j + 1)
}

fn next_content(tokens: &[Token], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&k| tokens[k].tag != Tag::Adverb)
}

/// Coordinated noun runs starting at `from`: `a name, an email and a phone
/// number` → `[name, email, phone number]`. Leading prepositions are skipped
/// when `after_preposition` is set (`inherits from Person`).
fn object_list(tokens: &[Token], from: usize, after_preposition: bool) -> Vec<Range<usize>> {
    let mut items = Vec::new();
    let mut i = from;
    if after_preposition {
        while i < tokens.len() && tokens[i].tag == Tag::Preposition {
            i += 1;
        }
    }
    loop {
        while i < tokens.len() && matches!(tokens[i].tag, Tag::Determiner | Tag::Adjective | Tag::Number | Tag::Adverb)
        {
            i += 1;
        }
        let start = i;
        while i < tokens.len() && tokens[i].is_noun() {
            i += 1;
        }
        if i == start {
            break;
        }
        items.push(start..i);
        if i < tokens.len() && (tokens[i].tag == Tag::Conjunction || tokens[i].is_punct(",")) {
            i += 1;
            if i < tokens.len() && tokens[i].tag == Tag::Conjunction {
                i += 1;
            }
            continue;
        }
        break;
    }
    items
}

fn join_words(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// MULTIPLICITY
// =============================================================================

/// Match quantifier patterns anchored on the two class names, in order.
fn multiplicity(sentence: &str, from: &str, to: &str) -> Option<RelationshipKind> {
    let (from, to) = (regex::escape(from), regex::escape(to));
    MULTIPLICITY_PATTERNS.iter().find_map(|(first, second)| {
        let pattern = format!(r"(?i)\b{first}\b.*?\b{from}\b.*?\b{second}\b.*?\b{to}\b");
        let matched = Regex::new(&pattern).is_ok_and(|re| re.is_match(sentence));
        matched.then(|| match (*first, *second) {
            ("many", "one") => RelationshipKind::ManyToOne,
            ("many", "many") => RelationshipKind::ManyToMany,
            _ => RelationshipKind::OneToMany,
        })
    })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
