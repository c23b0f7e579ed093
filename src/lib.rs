//! textuml — plain-language system descriptions to PlantUML diagrams.
//!
//! ARCHITECTURE
//! ============
//! ```text
//! text ─► extract (draft) ─► prompt ─► llm ─► interpret ─► validate
//!                                                              │
//!                      render ◄── model ◄── pipeline (accept / fallback)
//! ```
//!
//! `pipeline::generate` is the single entry point for one request;
//! `session::Session` layers per-session history on top of it.

pub mod error;
pub mod explain;
pub mod extract;
pub mod interpret;
pub mod llm;
pub mod model;
pub mod pipeline;
pub mod prompt;
pub mod render;
pub mod session;
pub mod store;
pub mod validate;

pub use error::ErrorCode;

/// Serializes tests that mutate process environment variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
