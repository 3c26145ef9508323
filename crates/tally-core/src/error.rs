//! Error types for the tally-core library.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::extract::ScreenRejection;

/// Main error type for the tally library.
#[derive(Error, Debug)]
pub enum TallyError {
    /// Extraction failed.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Error from the provider layer.
    #[error("provider error: {0}")]
    Provider(#[from] tally_provider::ProviderError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// One violated field-level or cross-field invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Path of the offending field, e.g. `line_items[0].total_price`.
    pub field: String,
    /// Human-readable reason.
    pub reason: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Prefix the field path with its parent, e.g. `line_items[2]`.
    pub(crate) fn nested(mut self, parent: &str) -> Self {
        self.field = format!("{}.{}", parent, self.field);
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Every invariant a rejected document violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationIssue>);

impl ValidationErrors {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self(issues)
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field paths of all issues.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|i| i.field.as_str())
    }
}

impl From<ValidationIssue> for ValidationErrors {
    fn from(issue: ValidationIssue) -> Self {
        Self(vec![issue])
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Why an extraction attempt produced no document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// The screener refused the input; no provider call was made.
    #[error("input rejected: {0}")]
    InputRejected(ScreenRejection),

    /// No target structure exists for the requested document type.
    #[error("unsupported document type: {0}")]
    UnsupportedDocumentType(String),

    /// The completion call failed.
    #[error("provider error: {0}")]
    Provider(#[from] tally_provider::ProviderError),

    /// The provider's answer violated the document's invariants.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
}

impl ExtractionError {
    /// The closed category this failure belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            ExtractionError::InputRejected(_) => FailureKind::InputRejected,
            ExtractionError::UnsupportedDocumentType(_) => FailureKind::UnsupportedDocumentType,
            ExtractionError::Provider(_) => FailureKind::Provider,
            ExtractionError::Validation(_) => FailureKind::Validation,
        }
    }

    /// Validation issues, empty for other kinds.
    pub fn validation_issues(&self) -> &[ValidationIssue] {
        match self {
            ExtractionError::Validation(errors) => errors.issues(),
            _ => &[],
        }
    }
}

impl From<ValidationErrors> for ExtractionError {
    fn from(errors: ValidationErrors) -> Self {
        ExtractionError::Validation(errors)
    }
}

/// Failure category exposed to callers without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InputRejected,
    UnsupportedDocumentType,
    Provider,
    Validation,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::InputRejected => "input_rejected",
            FailureKind::UnsupportedDocumentType => "unsupported_document_type",
            FailureKind::Provider => "provider",
            FailureKind::Validation => "validation",
        };
        f.write_str(s)
    }
}

/// Result type for the tally library.
pub type Result<T> = std::result::Result<T, TallyError>;
