//! Scripted `LlmChat` for tests.

use std::sync::Mutex;
use std::time::Duration;

use super::types::{ChatResponse, CompletionRequest, ContentBlock, LlmChat, LlmError};

pub(crate) enum Reply {
    Text(String),
    Fail(LlmError),
    Stall(Duration),
}

/// Replays canned replies in order; answers `{}` once they run out.
pub(crate) struct MockLlm {
    replies: Mutex<Vec<Reply>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlm {
    pub(crate) fn new(replies: Vec<Reply>) -> Self {
        Self { replies: Mutex::new(replies), requests: Mutex::new(Vec::new()) }
    }

    pub(crate) fn text(text: &str) -> Self {
        Self::new(vec![Reply::Text(text.to_owned())])
    }

    pub(crate) fn failing(err: LlmError) -> Self {
        Self::new(vec![Reply::Fail(err)])
    }

    pub(crate) fn stalled(delay: Duration) -> Self {
        Self::new(vec![Reply::Stall(delay)])
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmChat for MockLlm {
    async fn chat(&self, request: &CompletionRequest) -> Result<ChatResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() { Reply::Text("{}".into()) } else { replies.remove(0) }
        };
        let text = match reply {
            Reply::Text(text) => text,
            Reply::Fail(err) => return Err(err),
            Reply::Stall(delay) => {
                tokio::time::sleep(delay).await;
                "{}".into()
            }
        };
        Ok(ChatResponse {
            content: vec![ContentBlock::Text { text }],
            model: "mock".into(),
            stop_reason: "end_turn".into(),
            input_tokens: 0,
            output_tokens: 0,
        })
    }
}
