//! Schema-guided extraction over a completion provider.

use std::time::Instant;

use tally_provider::{CompletionProvider, CompletionRequest};
use tracing::{debug, info, warn};

use crate::error::{ExtractionError, ValidationErrors, ValidationIssue};
use crate::models::config::ProviderConfig;
use crate::models::draft::{RECEIPT_SCHEMA_NAME, ReceiptDraft, receipt_schema};
use crate::models::receipt::Receipt;
use crate::models::result::ExtractionResult;

use super::prompts::system_prompt;
use super::{DocumentExtractor, DocumentType, InputScreener};

/// Extractor issuing one structured-completion request per document.
///
/// Nothing the provider returns is trusted: its answer is deserialized into
/// a draft and then validated into a [`Receipt`]. Every failure, from the
/// screener to the final invariant check, is returned inside the
/// [`ExtractionResult`]; these methods never panic or return `Err`.
pub struct SchemaGuidedExtractor<P> {
    provider: P,
    screener: InputScreener,
    temperature: f32,
}

impl<P: CompletionProvider> SchemaGuidedExtractor<P> {
    /// Create an extractor with default settings.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            screener: InputScreener::new(),
            temperature: 0.0,
        }
    }

    /// Create an extractor using the provider section of the configuration.
    pub fn from_config(provider: P, config: &ProviderConfig) -> Self {
        Self::new(provider).with_temperature(config.temperature)
    }

    /// Set sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn run(&self, text: &str, document_type: &str) -> ExtractionResult {
        let start = Instant::now();

        let result = match self.attempt(text, document_type) {
            Ok((receipt, tokens)) => {
                debug!(
                    "Extracted receipt from {} with {} fields, confidence {:.2}",
                    receipt.merchant_name(),
                    receipt.populated_field_count(),
                    receipt.extraction_confidence()
                );
                ExtractionResult::success(receipt).with_tokens_used(tokens)
            }
            Err((error, tokens)) => {
                warn!("Extraction failed ({}): {}", error.kind(), error);
                ExtractionResult::failure(error).with_tokens_used(tokens)
            }
        };

        result.with_processing_time_ms(start.elapsed().as_millis() as u64)
    }

    /// One attempt; token usage is kept even when validation fails.
    fn attempt(
        &self,
        text: &str,
        document_type: &str,
    ) -> Result<(Receipt, Option<u32>), (ExtractionError, Option<u32>)> {
        self.screener
            .screen(text)
            .map_err(|r| (ExtractionError::InputRejected(r), None))?;

        let document_type: DocumentType = document_type.parse().map_err(|e| (e, None))?;

        info!(
            "Requesting {} extraction from {} for {} characters of text",
            document_type,
            self.provider.name(),
            text.len()
        );

        let request = CompletionRequest::new(RECEIPT_SCHEMA_NAME, receipt_schema())
            .with_system(system_prompt(document_type))
            .with_user(text)
            .with_temperature(self.temperature);

        let response = self
            .provider
            .complete(&request)
            .map_err(|e| (ExtractionError::Provider(e), None))?;

        let tokens = response.total_tokens();
        if let Some(tokens) = tokens {
            debug!("Provider reported {} total tokens", tokens);
        }

        let draft: ReceiptDraft = serde_json::from_value(response.output).map_err(|e| {
            let issue = ValidationIssue::new("document", format!("does not match schema: {}", e));
            (ExtractionError::Validation(ValidationErrors::from(issue)), tokens)
        })?;

        let receipt =
            Receipt::try_from(draft).map_err(|e| (ExtractionError::Validation(e), tokens))?;

        Ok((receipt, tokens))
    }
}

impl<P: CompletionProvider> DocumentExtractor for SchemaGuidedExtractor<P> {
    fn extract(&self, text: &str) -> ExtractionResult {
        self.run(text, DocumentType::Receipt.as_str())
    }

    fn extract_document(&self, text: &str, document_type: &str) -> ExtractionResult {
        self.run(text, document_type)
    }
}
