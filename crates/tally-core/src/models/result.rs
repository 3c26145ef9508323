//! Outcome of a single extraction call.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::{ExtractionError, FailureKind};

use super::receipt::Receipt;

/// What one extraction call produced.
///
/// Either a validated document or a typed failure, never both. Derived
/// values (confidence, field count, validation errors) are computed from
/// whichever side is present so they cannot drift from it.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    outcome: Result<Receipt, ExtractionError>,
    tokens_used: Option<u32>,
    processing_time_ms: u64,
}

impl ExtractionResult {
    /// A successful extraction owning its document.
    pub fn success(document: Receipt) -> Self {
        Self {
            outcome: Ok(document),
            tokens_used: None,
            processing_time_ms: 0,
        }
    }

    /// A failed extraction.
    pub fn failure(error: impl Into<ExtractionError>) -> Self {
        Self {
            outcome: Err(error.into()),
            tokens_used: None,
            processing_time_ms: 0,
        }
    }

    pub fn with_tokens_used(mut self, tokens: Option<u32>) -> Self {
        self.tokens_used = tokens;
        self
    }

    pub fn with_processing_time_ms(mut self, ms: u64) -> Self {
        self.processing_time_ms = ms;
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Success with a document present. Same as [`is_success`](Self::is_success).
    pub fn was_successful(&self) -> bool {
        self.document().is_some()
    }

    pub fn document(&self) -> Option<&Receipt> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ExtractionError> {
        self.outcome.as_ref().err()
    }

    pub fn error_kind(&self) -> Option<FailureKind> {
        self.error().map(ExtractionError::kind)
    }

    pub fn error_message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    /// Provider token usage, when reported.
    pub fn tokens_used(&self) -> Option<u32> {
        self.tokens_used
    }

    /// The document's own confidence, or 0.0 without a document.
    pub fn confidence_score(&self) -> f32 {
        self.document()
            .map(Receipt::extraction_confidence)
            .unwrap_or(0.0)
    }

    /// Non-null top-level fields of the document, 0 without one.
    pub fn fields_extracted(&self) -> usize {
        self.document()
            .map(Receipt::populated_field_count)
            .unwrap_or(0)
    }

    /// One line per violated invariant on a validation failure, else empty.
    pub fn validation_errors(&self) -> Vec<String> {
        self.error()
            .map(|e| e.validation_issues().iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    pub fn processing_time_ms(&self) -> u64 {
        self.processing_time_ms
    }

    pub fn into_document(self) -> Option<Receipt> {
        self.outcome.ok()
    }

    pub fn into_result(self) -> Result<Receipt, ExtractionError> {
        self.outcome
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ExtractionResult", 9)?;
        s.serialize_field("success", &self.is_success())?;
        s.serialize_field("document", &self.document())?;
        s.serialize_field("error_kind", &self.error_kind())?;
        s.serialize_field("error_message", &self.error_message())?;
        s.serialize_field("tokens_used", &self.tokens_used)?;
        s.serialize_field("confidence_score", &self.confidence_score())?;
        s.serialize_field("fields_extracted", &self.fields_extracted())?;
        s.serialize_field("validation_errors", &self.validation_errors())?;
        s.serialize_field("processing_time_ms", &self.processing_time_ms)?;
        s.end()
    }
}
