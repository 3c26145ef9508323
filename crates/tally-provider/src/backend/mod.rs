//! Completion backend implementations.

pub mod fixture;

#[cfg(feature = "openai")]
pub mod openai;

use crate::{CompletionRequest, CompletionResponse, Result};

/// Trait for structured-completion backends.
///
/// A backend receives a schema, instructions and input text, and returns a
/// JSON value it believes matches the schema. Nothing about that value is
/// guaranteed; callers validate it themselves.
pub trait CompletionProvider: Send + Sync {
    /// Issue one blocking completion request.
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;

    /// Short backend identifier used in logs.
    fn name(&self) -> &str;
}

impl<P: CompletionProvider + ?Sized> CompletionProvider for Box<P> {
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        (**self).complete(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<P: CompletionProvider + ?Sized> CompletionProvider for &P {
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        (**self).complete(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
