//! Core library for receipt extraction.
//!
//! This crate provides:
//! - Receipt data models whose arithmetic invariants are checked at construction
//! - An input screener gating provider calls
//! - A schema-guided extractor wrapping a structured-completion provider
//! - Configuration for the provider and extraction defaults

pub mod error;
pub mod extract;
pub mod models;

pub use error::{ExtractionError, FailureKind, Result, TallyError, ValidationErrors, ValidationIssue};
pub use extract::{
    DocumentExtractor, DocumentType, InputScreener, SchemaGuidedExtractor, ScreenRejection,
};
pub use models::receipt::{CategoryLabel, ExpenseCategory, LineItem, PaymentMethod, Receipt};
pub use models::result::ExtractionResult;

/// Re-export provider types.
pub use tally_provider::{
    CompletionProvider, CompletionRequest, CompletionResponse, FixtureBackend, ProviderError, Usage,
};

#[cfg(feature = "openai")]
pub use tally_provider::OpenAiBackend;
