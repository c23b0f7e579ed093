//! History store — per-session generation history behind an async trait.
//!
//! DESIGN
//! ======
//! The pipeline never owns history. Callers inject a [`HistoryStore`]; the
//! session service reads the last model from it to seed edit mode and writes
//! each turn back. [`MemoryStore`] is the in-process implementation; a
//! database-backed store implements the same three calls.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::ErrorCode;
use crate::model::{DiagramType, Model};

/// Turns kept per session; older turns are dropped first.
pub const MAX_TURNS: usize = 20;

// =============================================================================
// HISTORY
// =============================================================================

/// One generation: what was asked and what came back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub prompt: String,
    pub diagram_type: DiagramType,
    pub model: Model,
    pub diagram: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct History {
    turns: Vec<Turn>,
}

impl History {
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append a turn, evicting the oldest beyond [`MAX_TURNS`].
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
        if self.turns.len() > MAX_TURNS {
            let excess = self.turns.len() - MAX_TURNS;
            self.turns.drain(..excess);
        }
    }

    /// The most recent model of `diagram_type`, if any.
    #[must_use]
    pub fn last_model(&self, diagram_type: DiagramType) -> Option<&Model> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.diagram_type == diagram_type)
            .map(|turn| &turn.model)
    }
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("history backend failed: {0}")]
    Backend(String),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Backend(_) => "E_HISTORY_BACKEND",
        }
    }

    fn retryable(&self) -> bool {
        true
    }
}

#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    async fn get(&self, id: &str) -> Result<Option<History>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    async fn put(&self, id: &str, history: History) -> Result<(), StoreError>;

    /// Remove a session's history; `true` when something was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

/// In-process store. Cloned histories in and out; never fails.
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, History>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl HistoryStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<History>, StoreError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn put(&self, id: &str, history: History) -> Result<(), StoreError> {
        self.sessions.write().await.insert(id.to_owned(), history);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.sessions.write().await.remove(id).is_some())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
