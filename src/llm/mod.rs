//! LLM — completion gateway to an external text-completion service.
//!
//! DESIGN
//! ======
//! Configured from environment variables. The `LlmClient` dispatches to
//! Anthropic or `OpenAI` based on `LLM_PROVIDER`. The pipeline only sees the
//! [`LlmChat`] trait and [`request_completion`], which bounds the call with a
//! deadline and reduces the response to its text.
//!
//! A timeout, transport failure or non-2xx status is returned as a typed
//! [`LlmError`]; nothing here retries.

pub mod anthropic;
pub mod config;
pub mod openai;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

use std::time::{Duration, Instant};

use tracing::{debug, info};

use config::{LlmConfig, LlmProviderKind};
pub use types::{ChatResponse, CompletionRequest, LlmChat, LlmError};

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete LLM client that dispatches to either Anthropic or `OpenAI`.
///
/// Configured from environment variables by [`LlmClient::from_env`].
pub struct LlmClient {
    inner: LlmProvider,
    model: String,
}

enum LlmProvider {
    Anthropic(anthropic::AnthropicClient),
    OpenAi(openai::OpenAiClient),
}

impl LlmClient {
    /// Build an LLM client from environment variables. See
    /// [`LlmConfig::from_env`] for the variables read.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let model = config.model.clone();
        let inner = match config.provider {
            LlmProviderKind::Anthropic => {
                LlmProvider::Anthropic(anthropic::AnthropicClient::new(config.api_key, config.timeouts)?)
            }
            LlmProviderKind::OpenAi => LlmProvider::OpenAi(openai::OpenAiClient::new(
                config.api_key,
                config.openai_mode,
                config.openai_base_url,
                config.timeouts,
            )?),
        };
        Ok(Self { inner, model })
    }

    /// Return the configured model name (e.g. `"claude-sonnet-4-5-20250929"`).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn chat(&self, request: &CompletionRequest) -> Result<ChatResponse, LlmError> {
        match &self.inner {
            LlmProvider::Anthropic(c) => c.chat(&self.model, request).await,
            LlmProvider::OpenAi(c) => c.chat(&self.model, request).await,
        }
    }
}

/// Map a transport error, distinguishing the client-side deadline.
fn request_error(err: &reqwest::Error, timeout_secs: u64) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout { secs: timeout_secs }
    } else {
        LlmError::ApiRequest(err.to_string())
    }
}

// =============================================================================
// COMPLETION
// =============================================================================

/// Send one completion request and return the raw response text.
///
/// # Errors
///
/// Returns [`LlmError::Timeout`] when `timeout` elapses first,
/// [`LlmError::EmptyCompletion`] when the response has no text, and any
/// provider error unchanged.
pub async fn request_completion(
    llm: &dyn LlmChat,
    request: &CompletionRequest,
    timeout: Duration,
) -> Result<String, LlmError> {
    let started = Instant::now();
    debug!(prompt_len = request.prompt.len(), timeout_ms = timeout.as_millis(), "llm: completion requested");

    let response = tokio::time::timeout(timeout, llm.chat(request))
        .await
        .map_err(|_| LlmError::Timeout { secs: timeout.as_secs() })??;

    let text = response.text();
    info!(
        model = %response.model,
        stop_reason = %response.stop_reason,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        elapsed_ms = started.elapsed().as_millis(),
        "llm: completion received"
    );
    if text.trim().is_empty() {
        return Err(LlmError::EmptyCompletion);
    }
    Ok(text)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
