//! Session service — multi-turn editing on top of the pipeline.
//!
//! Each submit loads the session's history, seeds edit mode with the last
//! model of the requested diagram type, runs the pipeline and stores the new
//! turn. History failures are logged and never block generation; a turn
//! generated without a readable history is not written back.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::ErrorCode;
use crate::llm::LlmChat;
use crate::model::DiagramType;
use crate::pipeline::{self, GenerateRequest, Outcome, PipelineConfig};
use crate::store::{History, HistoryStore, Turn};

pub struct Session {
    store: Arc<dyn HistoryStore>,
    llm: Option<Arc<dyn LlmChat>>,
    config: PipelineConfig,
}

impl Session {
    #[must_use]
    pub fn new(store: Arc<dyn HistoryStore>, llm: Option<Arc<dyn LlmChat>>, config: PipelineConfig) -> Self {
        Self { store, llm, config }
    }

    /// Generate for `text`, editing the session's last model of the same type.
    ///
    /// When the history cannot be read the request runs in create mode and
    /// the turn is not stored, so the backend's copy is never overwritten.
    pub async fn submit(&self, id: &str, text: &str, diagram_type: DiagramType) -> Outcome {
        let loaded = self.load(id).await;
        let seed = loaded.as_ref().and_then(|h| h.last_model(diagram_type)).cloned();

        let request = GenerateRequest { text, diagram_type, existing: seed.as_ref() };
        let outcome = pipeline::generate(self.llm.as_deref(), &self.config, request).await;

        let Some(mut history) = loaded else {
            warn!(session = %id, "session: turn not stored, history unreadable");
            return outcome;
        };
        history.push(Turn {
            prompt: text.to_owned(),
            diagram_type,
            model: outcome.model.clone(),
            diagram: outcome.plantuml.clone(),
        });
        let turns = history.len();
        match self.store.put(id, history).await {
            Ok(()) => info!(session = %id, turns, source = outcome.source.as_str(), "session: turn stored"),
            Err(e) => warn!(session = %id, code = e.error_code(), error = %e, "session: history write failed"),
        }
        outcome
    }

    /// The session's history; empty when unknown or unreadable.
    pub async fn history(&self, id: &str) -> History {
        self.load(id).await.unwrap_or_default()
    }

    /// `None` when the store fails; an unknown session reads as empty.
    async fn load(&self, id: &str) -> Option<History> {
        match self.store.get(id).await {
            Ok(history) => Some(history.unwrap_or_default()),
            Err(e) => {
                warn!(session = %id, code = e.error_code(), error = %e, "session: history read failed");
                None
            }
        }
    }

    /// Forget the session; the next submit starts in create mode.
    pub async fn reset(&self, id: &str) -> bool {
        match self.store.delete(id).await {
            Ok(removed) => {
                info!(session = %id, removed, "session: reset");
                removed
            }
            Err(e) => {
                warn!(session = %id, code = e.error_code(), error = %e, "session: reset failed");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
