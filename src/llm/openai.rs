//! OpenAI-compatible API client.
//!
//! Supports both `/chat/completions` and `/responses` endpoints. Any
//! OpenAI-compatible server works through `LLM_OPENAI_BASE_URL`.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::config::{LlmTimeouts, OpenAiApiMode};
use super::types::{ChatResponse, CompletionRequest, ContentBlock, LlmError};

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    mode: OpenAiApiMode,
    timeouts: LlmTimeouts,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns [`LlmError::HttpClientBuild`] if the TLS backend fails to load.
    pub fn new(api_key: String, mode: OpenAiApiMode, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url, mode, timeouts })
    }

    /// # Errors
    ///
    /// Returns an [`LlmError`] on transport failure, timeout, non-2xx status
    /// or an unparseable body.
    pub async fn chat(&self, model: &str, request: &CompletionRequest) -> Result<ChatResponse, LlmError> {
        match self.mode {
            OpenAiApiMode::ChatCompletions => self.chat_completions(model, request).await,
            OpenAiApiMode::Responses => self.responses(model, request).await,
        }
    }

    async fn chat_completions(&self, model: &str, request: &CompletionRequest) -> Result<ChatResponse, LlmError> {
        let messages = build_chat_completions_messages(request);
        let body = CcRequest {
            model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: &messages,
        };
        let text = self.send_json("/chat/completions", &body).await?;
        parse_chat_completions_response(&text)
    }

    async fn responses(&self, model: &str, request: &CompletionRequest) -> Result<ChatResponse, LlmError> {
        let input = build_responses_input(request);
        let body = RespRequest {
            model,
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
            instructions: &request.system,
            input: &input,
        };
        let text = self.send_json("/responses", &body).await?;
        parse_responses_response(&text)
    }

    async fn send_json(&self, path: &str, body: &impl Serialize) -> Result<String, LlmError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| super::request_error(&e, self.timeouts.request_secs))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| super::request_error(&e, self.timeouts.request_secs))?;
        if !status.is_success() {
            return Err(LlmError::ApiResponse { status: status.as_u16(), body: text });
        }
        Ok(text)
    }
}

// =============================================================================
// CHAT COMPLETIONS — wire types
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: &'a [CcMessage<'a>],
}

#[derive(Debug, PartialEq, Eq, Serialize)]
struct CcMessage<'a> {
    role: &'static str,
    content: &'a str,
}

fn build_chat_completions_messages(request: &CompletionRequest) -> Vec<CcMessage<'_>> {
    let mut out = Vec::with_capacity(2);
    if !request.system.trim().is_empty() {
        out.push(CcMessage { role: "system", content: &request.system });
    }
    out.push(CcMessage { role: "user", content: &request.prompt });
    out
}

// =============================================================================
// RESPONSES — wire types
// =============================================================================

#[derive(Serialize)]
struct RespRequest<'a> {
    model: &'a str,
    max_output_tokens: u32,
    temperature: f32,
    instructions: &'a str,
    input: &'a [RespInputItem<'a>],
}

#[derive(Serialize)]
#[serde(tag = "type", rename = "message")]
struct RespInputItem<'a> {
    role: &'static str,
    content: Vec<RespTextContent<'a>>,
}

#[derive(Serialize)]
struct RespTextContent<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    text: &'a str,
}

fn build_responses_input(request: &CompletionRequest) -> Vec<RespInputItem<'_>> {
    vec![RespInputItem {
        role: "user",
        content: vec![RespTextContent { content_type: "input_text", text: &request.prompt }],
    }]
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

fn usage(root: &Value, key: &str) -> u64 {
    root.get("usage")
        .and_then(|u| u.get(key))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

fn model_name(root: &Value) -> String {
    root.get("model")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default()
}

pub(crate) fn parse_chat_completions_response(json_text: &str) -> Result<ChatResponse, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Err(LlmError::ApiParse("chat_completions: missing choices[0]".to_string()));
    };
    let finish_reason = choice
        .get("finish_reason")
        .and_then(Value::as_str)
        .unwrap_or("stop");

    let mut content = Vec::new();
    if let Some(text) = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
    {
        if !text.is_empty() {
            content.push(ContentBlock::Text { text: text.to_string() });
        }
    }

    let stop_reason = if finish_reason == "length" { "max_tokens" } else { "end_turn" };

    Ok(ChatResponse {
        content,
        model: model_name(&root),
        stop_reason: stop_reason.to_string(),
        input_tokens: usage(&root, "prompt_tokens"),
        output_tokens: usage(&root, "completion_tokens"),
    })
}

pub(crate) fn parse_responses_response(json_text: &str) -> Result<ChatResponse, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let mut content = Vec::new();
    if let Some(items) = root.get("output").and_then(Value::as_array) {
        let messages = items
            .iter()
            .filter(|item| item.get("type").and_then(Value::as_str) == Some("message"));
        for item in messages {
            let Some(parts) = item.get("content").and_then(Value::as_array) else {
                continue;
            };
            for part in parts {
                let kind = part.get("type").and_then(Value::as_str);
                let text = part
                    .get("text")
                    .or_else(|| part.get("output_text"))
                    .and_then(Value::as_str)
                    .unwrap_or("");
                if matches!(kind, Some("output_text" | "text")) && !text.is_empty() {
                    content.push(ContentBlock::Text { text: text.to_string() });
                }
            }
        }
    } else if let Some(output_text) = root.get("output_text").and_then(Value::as_str) {
        if !output_text.is_empty() {
            content.push(ContentBlock::Text { text: output_text.to_string() });
        }
    }

    let truncated = root
        .get("incomplete_details")
        .and_then(|d| d.get("reason"))
        .and_then(Value::as_str)
        == Some("max_output_tokens");
    let stop_reason = if truncated { "max_tokens" } else { "end_turn" };

    Ok(ChatResponse {
        content,
        model: model_name(&root),
        stop_reason: stop_reason.to_string(),
        input_tokens: usage(&root, "input_tokens"),
        output_tokens: usage(&root, "output_tokens"),
    })
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
