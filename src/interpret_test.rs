use super::*;
use crate::error::ErrorCode;
use serde_json::json;

#[test]
fn plain_object_parses() {
    let value = interpret(r#"{"classes": [], "relationships": []}"#).unwrap();
    assert_eq!(value, json!({ "classes": [], "relationships": [] }));
}

#[test]
fn json_fence_with_prose_around_it() {
    let raw = "Here is the model:\n```json\n{\"classes\": [{\"name\": \"A\"}]}\n```\nLet me know!";
    assert_eq!(interpret(raw).unwrap(), json!({ "classes": [{ "name": "A" }] }));
}

#[test]
fn json_fence_tag_is_case_insensitive() {
    let raw = "```JSON\n{\"actors\": []}\n```";
    assert_eq!(interpret(raw).unwrap(), json!({ "actors": [] }));
}

#[test]
fn bare_fence_without_language() {
    let raw = "```\n{\"participants\": [\"A\"]}\n```";
    assert_eq!(interpret(raw).unwrap(), json!({ "participants": ["A"] }));
}

#[test]
fn braces_inside_prose() {
    let raw = "Sure! {\"classes\": [], \"relationships\": []} Hope that helps.";
    assert_eq!(interpret(raw).unwrap(), json!({ "classes": [], "relationships": [] }));
}

#[test]
fn unclosed_fence_still_parses() {
    let raw = "```json\n{\"classes\": []}";
    assert_eq!(interpret(raw).unwrap(), json!({ "classes": [] }));
}

#[test]
fn trailing_commas_are_repaired() {
    let raw = "{\"classes\": [{\"name\": \"A\", \"attributes\": [\"x\", \"y\",],},], \"relationships\": [],}";
    let value = interpret(raw).unwrap();
    assert_eq!(value["classes"][0]["attributes"], json!(["x", "y"]));
    assert_eq!(value["relationships"], json!([]));
}

#[test]
fn commas_inside_strings_are_kept() {
    let raw = r#"{"label": "a,}", "quote": "say \",]\"", "list": [1, 2,]}"#;
    let value = interpret(raw).unwrap();
    assert_eq!(value["label"], "a,}");
    assert_eq!(value["quote"], "say \",]\"");
    assert_eq!(value["list"], json!([1, 2]));
}

#[test]
fn fence_that_fails_falls_through_to_braces() {
    let raw = "```json\nnot json at all\n```\n{\"classes\": []}";
    assert_eq!(interpret(raw).unwrap(), json!({ "classes": [] }));
}

#[test]
fn json_string_is_not_parsed_twice() {
    let raw = r#""{\"classes\": []}""#;
    assert!(matches!(interpret(raw), Err(InterpretError::Parse(_))));

    let fenced = "```json\n\"{\\\"classes\\\": []}\"\n```";
    assert!(interpret(fenced).is_err());
}

#[test]
fn array_payload_is_rejected() {
    let err = interpret("```json\n[1, 2]\n```").unwrap_err();
    assert!(matches!(err, InterpretError::NotAnObject { found: "an array" }));
}

#[test]
fn empty_and_jsonless_text() {
    assert!(matches!(interpret("  \n"), Err(InterpretError::Empty)));
    assert!(matches!(interpret("I cannot help with that."), Err(InterpretError::NoCandidate)));
}

#[test]
fn malformed_json_reports_parse_error() {
    let err = interpret("{\"classes\": [}").unwrap_err();
    assert!(matches!(err, InterpretError::Parse(_)));
    assert_eq!(err.error_code(), "E_INTERPRET_PARSE");
}
