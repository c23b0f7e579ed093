use super::*;

fn make_response(content: serde_json::Value) -> String {
    serde_json::json!({
        "id": "msg_123",
        "type": "message",
        "role": "assistant",
        "content": content,
        "model": "claude-sonnet-4-5-20250929",
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 100, "output_tokens": 50 }
    })
    .to_string()
}

#[test]
fn parse_text_response() {
    let json = make_response(serde_json::json!([
        { "type": "text", "text": "{\"classes\": []}" }
    ]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert_eq!(resp.text(), "{\"classes\": []}");
    assert_eq!(resp.model, "claude-sonnet-4-5-20250929");
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 100);
    assert_eq!(resp.output_tokens, 50);
}

#[test]
fn parse_unknown_content_filtered() {
    let json = make_response(serde_json::json!([
        { "type": "text", "text": "hi" },
        { "type": "some_future_type", "data": {} }
    ]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { .. }));
}

#[test]
fn parse_thinking_blocks_are_filtered() {
    let json = make_response(serde_json::json!([
        { "type": "thinking", "thinking": "Let me think..." },
        { "type": "text", "text": "Here is my answer" }
    ]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert_eq!(resp.text(), "Here is my answer");
}

#[test]
fn parse_null_stop_reason_defaults() {
    let json = serde_json::json!({
        "content": [{ "type": "text", "text": "ok" }],
        "model": "m",
        "stop_reason": null,
        "usage": { "input_tokens": 1, "output_tokens": 1 }
    })
    .to_string();
    assert_eq!(parse_response(&json).unwrap().stop_reason, "end_turn");
}

#[test]
fn parse_invalid_json() {
    let err = parse_response("not json").unwrap_err();
    assert!(matches!(err, LlmError::ApiParse(_)));
}

#[test]
fn request_body_carries_sampling_and_single_message() {
    let request =
        CompletionRequest { system: "sys".into(), prompt: "draw".into(), temperature: 0.2, max_tokens: 64 };
    let messages = request.messages();
    let body = ApiRequest {
        model: "m",
        max_tokens: request.max_tokens,
        system: &request.system,
        messages: &messages,
        temperature: request.temperature,
    };
    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(value["max_tokens"], 64);
    assert_eq!(value["system"], "sys");
    assert_eq!(value["messages"], serde_json::json!([{ "role": "user", "content": "draw" }]));
    assert!((value["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
}
