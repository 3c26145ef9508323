//! Document extraction: screening, prompting and validated construction.

mod extractor;
pub mod prompts;
pub mod rules;
mod screen;

pub use extractor::SchemaGuidedExtractor;
pub use screen::{InputScreener, MIN_INPUT_CHARS, SUSPICIOUS_PATTERNS, ScreenRejection};

use std::fmt;
use std::str::FromStr;

use crate::error::ExtractionError;
use crate::models::result::ExtractionResult;

/// Trait for document extractors.
pub trait DocumentExtractor {
    /// Extract a receipt from raw text.
    fn extract(&self, text: &str) -> ExtractionResult;

    /// Extract a document of the named type from raw text.
    fn extract_document(&self, text: &str, document_type: &str) -> ExtractionResult;
}

/// Document types with a known target structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Receipt,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Receipt => "receipt",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "receipt" => Ok(DocumentType::Receipt),
            _ => Err(ExtractionError::UnsupportedDocumentType(s.trim().to_string())),
        }
    }
}
