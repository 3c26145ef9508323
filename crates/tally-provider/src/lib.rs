//! Structured-completion provider layer for tally.
//!
//! This crate provides a unified interface for asking a language model to
//! fill a caller-supplied JSON Schema:
//! - `openai` backend speaking the OpenAI-compatible chat-completions API
//! - `fixture` backend replaying a recorded answer (offline runs and tests)

mod backend;
mod error;
mod request;

pub use backend::CompletionProvider;
pub use backend::fixture::FixtureBackend;
pub use error::ProviderError;
pub use request::{CompletionRequest, CompletionResponse, Usage};

#[cfg(feature = "openai")]
pub use backend::openai::OpenAiBackend;

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
