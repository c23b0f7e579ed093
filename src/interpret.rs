//! Response interpreter — pull one JSON object out of raw completion text.
//!
//! DESIGN
//! ======
//! Completion text is often wrapped in prose or Markdown. Candidates are tried
//! in order until one parses to a JSON object:
//!
//! 1. the inner text of a ```` ```json ```` fence;
//! 2. the inner text of any ```` ``` ```` fence;
//! 3. the span from the first `{` to the last `}`.
//!
//! Each candidate has trailing commas before `}` / `]` removed (outside string
//! literals) and is parsed once with `serde_json`. A payload that parses to a
//! string is rejected, never parsed a second time.

use serde_json::Value;
use tracing::debug;

use crate::error::ErrorCode;

/// Why no JSON object could be recovered from completion text.
#[derive(Debug, thiserror::Error)]
pub enum InterpretError {
    #[error("completion text is empty")]
    Empty,

    #[error("no JSON object found in completion text")]
    NoCandidate,

    #[error("JSON payload did not parse: {0}")]
    Parse(String),

    #[error("JSON payload is {found}, expected an object")]
    NotAnObject { found: &'static str },
}

impl ErrorCode for InterpretError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "E_INTERPRET_EMPTY",
            Self::NoCandidate => "E_INTERPRET_NO_JSON",
            Self::Parse(_) => "E_INTERPRET_PARSE",
            Self::NotAnObject { .. } => "E_INTERPRET_NOT_OBJECT",
        }
    }
}

/// Recover the JSON object carried by `raw`.
///
/// # Errors
///
/// Returns the error of the last candidate tried, or
/// [`InterpretError::NoCandidate`] when the text holds no fence or braces.
pub fn interpret(raw: &str) -> Result<Value, InterpretError> {
    if raw.trim().is_empty() {
        return Err(InterpretError::Empty);
    }

    let strategies: [(&str, fn(&str) -> Option<&str>); 3] =
        [("json_fence", json_fence), ("any_fence", any_fence), ("braces", brace_span)];

    let mut last_error = InterpretError::NoCandidate;
    let mut tried: Vec<&str> = Vec::new();
    for (strategy, find) in strategies {
        let Some(candidate) = find(raw).map(str::trim).filter(|c| !c.is_empty()) else {
            continue;
        };
        if tried.contains(&candidate) {
            continue;
        }
        tried.push(candidate);

        match serde_json::from_str::<Value>(&strip_trailing_commas(candidate)) {
            Ok(value @ Value::Object(_)) => {
                debug!(strategy, "interpret: payload recovered");
                return Ok(value);
            }
            Ok(other) => last_error = InterpretError::NotAnObject { found: json_kind(&other) },
            Err(e) => last_error = InterpretError::Parse(e.to_string()),
        }
        debug!(strategy, error = %last_error, "interpret: candidate rejected");
    }
    Err(last_error)
}

// =============================================================================
// CANDIDATES
// =============================================================================

const FENCE: &str = "```";

fn json_fence(raw: &str) -> Option<&str> {
    let lower = raw.to_ascii_lowercase();
    let start = lower.find("```json")? + "```json".len();
    Some(fence_body(&raw[start..]))
}

fn any_fence(raw: &str) -> Option<&str> {
    let after = &raw[raw.find(FENCE)? + FENCE.len()..];
    // Skip the info string on the opening line.
    let body = match after.find('\n') {
        Some(newline) if !after[..newline].contains(FENCE) => &after[newline + 1..],
        _ => after,
    };
    Some(fence_body(body))
}

/// Text up to the closing fence; an unclosed fence runs to the end.
fn fence_body(after_open: &str) -> &str {
    after_open.find(FENCE).map_or(after_open, |end| &after_open[..end])
}

fn brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

// =============================================================================
// REPAIR
// =============================================================================

/// Drop commas that directly precede `}` or `]`, ignoring string contents.
fn strip_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if c == ',' {
            let next = chars[i + 1..].iter().find(|n| !n.is_whitespace());
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }
        if c == '"' {
            in_string = true;
        }
        out.push(c);
    }
    out
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "interpret_test.rs"]
mod tests;
