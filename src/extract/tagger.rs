//! Rule-based tokenizer and part-of-speech tagger.
//!
//! DESIGN
//! ======
//! Closed word classes (determiners, conjunctions, prepositions, pronouns,
//! modals, adverbs) come from fixed lexicons. Verbs are recognized from a
//! lexicon of base forms plus inflection stripping, and by one contextual rule:
//! an unknown lowercase word ending in `-s`/`-ed` that sits between a noun and
//! a noun phrase is a verb ("customer orders products"). Everything else is a
//! noun, proper when capitalized.
//!
//! The tagger is deterministic: the same text always yields the same tags.

// =============================================================================
// LEXICONS
// =============================================================================

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any", "all", "no", "its", "their",
    "his", "her", "our", "your", "my", "another", "other", "one", "many", "multiple", "several", "single", "various",
    "few", "both", "zero",
];

const CONJUNCTIONS: &[&str] = &["and", "or", "but", "nor", "&"];

const PREPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "to", "for", "with", "by", "from", "into", "onto", "about", "through", "via", "within",
    "without", "under", "over", "between", "among", "per", "as", "like", "after", "before", "during", "upon",
];

const PRONOUNS: &[&str] = &[
    "it", "they", "them", "he", "she", "him", "we", "us", "you", "i", "who", "which", "whom", "whose", "what",
    "itself", "themselves", "there", "where", "when",
];

const MODALS: &[&str] = &["can", "could", "should", "must", "may", "might", "will", "would", "shall", "cannot"];

const ADVERBS: &[&str] = &[
    "not", "also", "only", "then", "always", "never", "often", "usually", "directly", "very", "just", "still",
    "already", "optionally", "automatically", "either", "too", "later", "again",
];

const ADJECTIVES: &[&str] = &[
    "unique", "new", "old", "active", "inactive", "valid", "current", "primary", "secondary", "main", "total",
    "full", "first", "last", "personal", "public", "private", "available", "different", "specific", "basic",
    "premium", "registered", "special",
];

/// Base forms recognized as verbs. Words that are mostly nouns in system
/// descriptions (order, book, account) are absent; lexicon verbs that follow a
/// determiner or adjective are re-tagged as nouns ("a deposit").
const VERBS: &[&str] = &[
    "be", "have", "do", "contain", "include", "comprise", "consist", "compose", "hold", "own", "inherit", "extend",
    "derive", "implement", "specialize", "subclass", "use", "place", "make", "create", "manage", "borrow", "return",
    "lend", "view", "edit", "update", "delete", "remove", "add", "login", "logout", "log", "sign", "register", "pay",
    "buy", "sell", "send", "receive", "belong", "write", "read", "teach", "enroll", "attend", "assign", "approve",
    "reject", "submit", "cancel", "reserve", "search", "browse", "track", "ship", "deliver", "store", "generate",
    "handle", "provide", "check", "verify", "validate", "authenticate", "purchase", "rent", "employ", "supervise",
    "treat", "prescribe", "host", "join", "follow", "post", "publish", "upload", "download", "share", "rate",
    "notify", "calculate", "display", "select", "choose", "open", "close", "withdraw", "deposit", "transfer",
    "apply", "support", "refer", "connect", "drive", "fly", "visit", "serve", "prepare", "cook", "maintain",
    "monitor", "control", "configure", "install", "run", "execute", "invoke", "call", "get", "set", "save", "load",
    "go", "take", "give", "keep", "leave", "answer", "ask", "complete", "start", "stop", "define", "represent",
    "describe", "access", "modify", "print", "work", "live", "study",
];

const IRREGULAR_VERBS: &[(&str, &str)] = &[
    ("is", "be"),
    ("are", "be"),
    ("was", "be"),
    ("were", "be"),
    ("am", "be"),
    ("been", "be"),
    ("being", "be"),
    ("has", "have"),
    ("had", "have"),
    ("having", "have"),
    ("does", "do"),
    ("did", "do"),
    ("done", "do"),
    ("goes", "go"),
    ("went", "go"),
    ("made", "make"),
    ("took", "take"),
    ("taken", "take"),
    ("gave", "give"),
    ("given", "give"),
    ("sent", "send"),
    ("paid", "pay"),
    ("bought", "buy"),
    ("sold", "sell"),
    ("held", "hold"),
    ("wrote", "write"),
    ("written", "write"),
    ("got", "get"),
    ("kept", "keep"),
    ("left", "leave"),
    ("lent", "lend"),
    ("taught", "teach"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("ran", "run"),
    ("drove", "drive"),
    ("flew", "fly"),
];

const IRREGULAR_PLURALS: &[&str] = &["people", "children", "men", "women", "data", "media", "criteria", "feet", "mice"];

// =============================================================================
// TOKENS
// =============================================================================

/// Part-of-speech tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Noun,
    ProperNoun,
    Verb,
    Modal,
    Determiner,
    Conjunction,
    Preposition,
    Pronoun,
    Adjective,
    Adverb,
    Number,
    Punct,
}

/// A tagged word with its lemma (verbs) or lowercase form (everything else).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub lower: String,
    pub lemma: String,
    pub tag: Tag,
}

impl Token {
    #[must_use]
    pub fn is_noun(&self) -> bool {
        matches!(self.tag, Tag::Noun | Tag::ProperNoun)
    }

    #[must_use]
    pub fn is_capitalized(&self) -> bool {
        self.text.chars().next().is_some_and(char::is_uppercase)
    }

    #[must_use]
    pub fn is_punct(&self, symbol: &str) -> bool {
        self.tag == Tag::Punct && self.text == symbol
    }
}

// =============================================================================
// SPLITTING
// =============================================================================

/// Split text into sentences on `.`, `!`, `?` followed by whitespace or end of
/// text. Decimal points and dotted identifiers stay inside their sentence.
#[must_use]
pub fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
            if at_boundary {
                let end = i + c.len_utf8();
                push_trimmed(&mut out, &text[start..end]);
                start = end;
            }
        }
    }
    push_trimmed(&mut out, &text[start..]);
    out
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        out.push(trimmed);
    }
}

/// Split a sentence into word and punctuation tokens. Apostrophes, hyphens and
/// underscores inside a word stay part of it (`e-mail`, `user_id`).
#[must_use]
pub fn tokenize(sentence: &str) -> Vec<String> {
    let chars: Vec<char> = sentence.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        let joins_word = matches!(c, '\'' | '-' | '_')
            && !current.is_empty()
            && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());
        if c.is_alphanumeric() || joins_word {
            current.push(c);
            continue;
        }
        if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        if !c.is_whitespace() {
            words.push(c.to_string());
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

// =============================================================================
// TAGGING
// =============================================================================

/// Tag a tokenized sentence.
#[must_use]
pub fn tag(words: &[String]) -> Vec<Token> {
    let mut tokens: Vec<Token> = words
        .iter()
        .enumerate()
        .map(|(i, word)| lexical_token(word, i == 0))
        .collect();

    for i in 0..tokens.len() {
        let previous = previous_content_tag(&tokens, i);
        let contextual_verb = is_contextual_verb(&tokens, i);
        let imperative = i == 0 && is_imperative(&tokens);
        let token = &mut tokens[i];
        match token.tag {
            Tag::Verb if is_lexicon_verb(&token.lower) && matches!(previous, Some(Tag::Determiner | Tag::Adjective)) => {
                token.tag = Tag::Noun;
                token.lemma.clone_from(&token.lower);
            }
            Tag::Noun if !token.is_capitalized() => {
                if previous == Some(Tag::Modal) || contextual_verb {
                    token.lemma = lemmatize_verb(&token.lower);
                    token.tag = Tag::Verb;
                }
            }
            Tag::ProperNoun if imperative => {
                if let Some(base) = verb_base(&token.lower) {
                    token.lemma = base;
                    token.tag = Tag::Verb;
                }
            }
            _ => {}
        }
    }
    tokens
}

/// A sentence opening with a bare verb followed by a determiner
/// ("Register a Customer").
fn is_imperative(tokens: &[Token]) -> bool {
    tokens.get(1).is_some_and(|next| next.tag == Tag::Determiner)
}

/// Tag of the nearest preceding token that is not an adverb.
fn previous_content_tag(tokens: &[Token], i: usize) -> Option<Tag> {
    tokens[..i]
        .iter()
        .rev()
        .find(|t| t.tag != Tag::Adverb)
        .map(|t| t.tag)
}

fn is_lexicon_verb(lower: &str) -> bool {
    !IRREGULAR_VERBS.iter().any(|(form, _)| *form == lower) && verb_base(lower).is_some()
}

fn lexical_token(word: &str, sentence_start: bool) -> Token {
    let lower = word.to_lowercase();
    let capitalized = word.chars().next().is_some_and(char::is_uppercase);
    let tag = if !word.chars().any(char::is_alphanumeric) {
        Tag::Punct
    } else if word.chars().all(|c| c.is_ascii_digit()) {
        Tag::Number
    } else if capitalized && !sentence_start {
        if lower == "i" { Tag::Pronoun } else { Tag::ProperNoun }
    } else if let Some(tag) = closed_class(&lower) {
        tag
    } else if verb_base(&lower).is_some() && !capitalized {
        Tag::Verb
    } else if capitalized {
        Tag::ProperNoun
    } else if is_adjective(&lower) {
        Tag::Adjective
    } else {
        Tag::Noun
    };
    let lemma = if tag == Tag::Verb { verb_base(&lower).unwrap_or_else(|| lower.clone()) } else { lower.clone() };
    Token { text: word.to_owned(), lower, lemma, tag }
}

fn closed_class(lower: &str) -> Option<Tag> {
    if DETERMINERS.contains(&lower) {
        Some(Tag::Determiner)
    } else if CONJUNCTIONS.contains(&lower) {
        Some(Tag::Conjunction)
    } else if PREPOSITIONS.contains(&lower) {
        Some(Tag::Preposition)
    } else if PRONOUNS.contains(&lower) {
        Some(Tag::Pronoun)
    } else if MODALS.contains(&lower) {
        Some(Tag::Modal)
    } else if ADVERBS.contains(&lower) {
        Some(Tag::Adverb)
    } else if IRREGULAR_VERBS.iter().any(|(form, _)| *form == lower) {
        Some(Tag::Verb)
    } else {
        None
    }
}

fn is_adjective(lower: &str) -> bool {
    ADJECTIVES.contains(&lower)
        || (lower.len() > 5
            && ["ous", "ful", "ible", "able", "less"]
                .iter()
                .any(|suffix| lower.ends_with(suffix)))
}

/// `noun <word>s|ed <determiner|noun|number>` with `<word>` unknown.
fn is_contextual_verb(tokens: &[Token], i: usize) -> bool {
    let word = &tokens[i].lower;
    let inflected = (word.ends_with('s') && !word.ends_with("ss")) || word.ends_with("ed");
    let after_noun = i > 0 && tokens[i - 1].is_noun();
    let before_phrase = tokens
        .get(i + 1)
        .is_some_and(|next| matches!(next.tag, Tag::Determiner | Tag::ProperNoun | Tag::Noun | Tag::Number));
    inflected && after_noun && before_phrase
}

// =============================================================================
// MORPHOLOGY
// =============================================================================

/// Base form of `lower` if it is a known verb or an inflection of one.
#[must_use]
pub fn verb_base(lower: &str) -> Option<String> {
    if VERBS.contains(&lower) {
        return Some(lower.to_owned());
    }
    if let Some((_, base)) = IRREGULAR_VERBS.iter().find(|(form, _)| *form == lower) {
        return Some((*base).to_owned());
    }
    let candidate = lemmatize_verb(lower);
    (candidate != lower && VERBS.contains(&candidate.as_str())).then_some(candidate)
}

/// Strip regular inflection from a verb form. Irregular forms come from the
/// lexicon; unknown words get a best-effort stem.
#[must_use]
pub fn lemmatize_verb(lower: &str) -> String {
    if let Some((_, base)) = IRREGULAR_VERBS.iter().find(|(form, _)| *form == lower) {
        return (*base).to_owned();
    }
    if let Some(stem) = lower.strip_suffix("ies").filter(|s| s.len() > 1) {
        return format!("{stem}y");
    }
    if let Some(stem) = lower.strip_suffix("es") {
        if ["ss", "sh", "ch", "x", "z"].iter().any(|end| stem.ends_with(end)) {
            return stem.to_owned();
        }
    }
    if let Some(stem) = lower.strip_suffix('s').filter(|s| !s.ends_with('s') && s.len() > 1) {
        return stem.to_owned();
    }
    if let Some(stem) = lower.strip_suffix("ied") {
        return format!("{stem}y");
    }
    for suffix in ["ed", "ing"] {
        if let Some(stem) = lower.strip_suffix(suffix).filter(|s| s.len() > 1) {
            return restore_stem(stem);
        }
    }
    lower.to_owned()
}

/// Undo spelling changes made before `-ed`/`-ing`: a dropped `e`
/// (`placed` → `place`) or a doubled consonant (`stopped` → `stop`).
fn restore_stem(stem: &str) -> String {
    if VERBS.contains(&stem) {
        return stem.to_owned();
    }
    let with_e = format!("{stem}e");
    if VERBS.contains(&with_e.as_str()) {
        return with_e;
    }
    let mut tail = stem.chars().rev();
    if let (Some(last), Some(before)) = (tail.next(), tail.next()) {
        if last == before && last.is_ascii_alphabetic() && stem.len() > 2 {
            let undoubled = &stem[..stem.len() - last.len_utf8()];
            if VERBS.contains(&undoubled) {
                return undoubled.to_owned();
            }
        }
    }
    stem.to_owned()
}

/// Whether a lowercase noun form is grammatically plural.
#[must_use]
pub fn is_plural(lower: &str) -> bool {
    if IRREGULAR_PLURALS.contains(&lower) {
        return true;
    }
    lower.len() > 3 && lower.ends_with('s') && !["ss", "us", "is"].iter().any(|end| lower.ends_with(end))
}

#[cfg(test)]
#[path = "tagger_test.rs"]
mod tests;
