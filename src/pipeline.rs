//! Generation pipeline — text in, model + diagram out, with fallbacks.
//!
//! DESIGN
//! ======
//! ```text
//! text ─► extract::draft ─► prompt::build ─► llm::request_completion
//!      ─► interpret ─► validate ─► Model::from_value ─► candidate
//! ```
//!
//! Every failure after the draft is ready falls back instead of erroring: no
//! completion service, a failed or timed-out completion, no JSON object in
//! the completion, a payload without the diagram's top-level keys, or one
//! that has them but will not decode. The fallback is the seed when there is
//! one, otherwise the draft. The reason travels in [`Outcome::fallback`].
//!
//! The seed is the caller's previous model for the same diagram type (edit
//! mode). It is only read, never modified. The completion call is the only
//! suspension point and is bounded by `PipelineConfig::timeout`; nothing is
//! retried here.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::ErrorCode;
use crate::explain::explain;
use crate::interpret::{self, InterpretError};
use crate::llm::config::{
    DEFAULT_LLM_MAX_TOKENS, DEFAULT_LLM_REQUEST_TIMEOUT_SECS, DEFAULT_LLM_TEMPERATURE, env_parse,
};
use crate::llm::{self, LlmChat, LlmError};
use crate::model::{DiagramType, Model};
use crate::{extract, prompt, render, validate};

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Deadline for the completion call.
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
            temperature: DEFAULT_LLM_TEMPERATURE,
            max_tokens: DEFAULT_LLM_MAX_TOKENS,
        }
    }
}

impl PipelineConfig {
    /// Read `LLM_REQUEST_TIMEOUT_SECS`, `LLM_TEMPERATURE` and `LLM_MAX_TOKENS`;
    /// unset or malformed values keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            timeout: Duration::from_secs(env_parse("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS)),
            temperature: env_parse("LLM_TEMPERATURE", DEFAULT_LLM_TEMPERATURE),
            max_tokens: env_parse("LLM_MAX_TOKENS", DEFAULT_LLM_MAX_TOKENS),
        }
    }
}

// =============================================================================
// TYPES
// =============================================================================

pub struct GenerateRequest<'a> {
    pub text: &'a str,
    pub diagram_type: DiagramType,
    /// The current model; switches the prompt to edit mode.
    pub existing: Option<&'a Model>,
}

/// Which model the pipeline returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSource {
    /// The completion service's model, validated and decoded.
    Candidate,
    /// The caller's previous model, unchanged.
    Seed,
    /// The heuristic draft.
    Draft,
}

impl ModelSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Candidate => "candidate",
            Self::Seed => "seed",
            Self::Draft => "draft",
        }
    }
}

/// Why the completion service's model was not used.
#[derive(Debug, thiserror::Error)]
pub enum FallbackReason {
    #[error("completion service not configured")]
    Unavailable,

    #[error("completion failed: {0}")]
    Completion(#[from] LlmError),

    #[error("completion unusable: {0}")]
    Interpretation(#[from] InterpretError),

    #[error("payload does not have the {diagram_type} diagram shape")]
    Incompatible { diagram_type: DiagramType },

    #[error("payload could not be decoded: {0}")]
    Decode(String),
}

impl ErrorCode for FallbackReason {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable => "E_LLM_UNAVAILABLE",
            Self::Completion(e) => e.error_code(),
            Self::Interpretation(e) => e.error_code(),
            Self::Incompatible { .. } => "E_INCOMPATIBLE_MODEL",
            Self::Decode(_) => "E_MODEL_DECODE",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Completion(e) => e.retryable(),
            _ => false,
        }
    }
}

/// Result of one generation: always a model and its diagram.
#[derive(Debug)]
pub struct Outcome {
    pub diagram_type: DiagramType,
    pub model: Model,
    pub plantuml: String,
    pub explanation: String,
    pub source: ModelSource,
    pub fallback: Option<FallbackReason>,
}

impl Outcome {
    fn new(model: Model, source: ModelSource, fallback: Option<FallbackReason>) -> Self {
        Self {
            diagram_type: model.diagram_type(),
            plantuml: render::render_model(&model),
            explanation: explain(&model),
            model,
            source,
            fallback,
        }
    }
}

// =============================================================================
// GENERATE
// =============================================================================

/// Run the pipeline for one request. Never fails; see the module docs for the
/// fallback rules.
pub async fn generate(llm: Option<&dyn LlmChat>, config: &PipelineConfig, request: GenerateRequest<'_>) -> Outcome {
    let GenerateRequest { text, diagram_type, existing } = request;

    let seed = match existing {
        Some(model) if model.diagram_type() != diagram_type => {
            warn!(seed_type = %model.diagram_type(), %diagram_type, "pipeline: seed ignored, diagram type differs");
            None
        }
        other => other,
    };
    let mode = if seed.is_some() { "edit" } else { "create" };

    let draft = extract::draft(text, diagram_type);
    info!(%diagram_type, mode, text_len = text.len(), draft_entities = draft.entity_count(), "pipeline: draft ready");

    match refine(llm, config, text, diagram_type, &draft, seed).await {
        Ok(candidate) => {
            info!(%diagram_type, mode, entities = candidate.entity_count(), "pipeline: candidate accepted");
            Outcome::new(candidate, ModelSource::Candidate, None)
        }
        Err(reason) => {
            let (model, source) = match seed {
                Some(seed) => (seed.clone(), ModelSource::Seed),
                None => (draft, ModelSource::Draft),
            };
            warn!(
                %diagram_type,
                mode,
                code = reason.error_code(),
                error = %reason,
                source = source.as_str(),
                "pipeline: falling back"
            );
            Outcome::new(model, source, Some(reason))
        }
    }
}

async fn refine(
    llm: Option<&dyn LlmChat>,
    config: &PipelineConfig,
    text: &str,
    diagram_type: DiagramType,
    draft: &Model,
    seed: Option<&Model>,
) -> Result<Model, FallbackReason> {
    let llm = llm.ok_or(FallbackReason::Unavailable)?;

    let mut request = prompt::build(text, diagram_type, draft, seed);
    request.temperature = config.temperature;
    request.max_tokens = config.max_tokens;

    let raw = llm::request_completion(llm, &request, config.timeout).await?;
    let value = interpret::interpret(&raw)?;
    if !validate::validate(&value, diagram_type) {
        return Err(FallbackReason::Incompatible { diagram_type });
    }
    Model::from_value(diagram_type, value).map_err(|e| FallbackReason::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
