//! Replay backend returning a recorded answer.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;
use tracing::debug;

use crate::error::ProviderError;
use crate::request::{CompletionRequest, CompletionResponse, Usage};
use crate::{CompletionProvider, Result};

/// Backend that answers every request with the same recorded result.
pub struct FixtureBackend {
    answer: std::result::Result<Value, ProviderError>,
    usage: Option<Usage>,
    calls: AtomicUsize,
}

impl FixtureBackend {
    /// Answer with the given JSON document.
    pub fn new(output: Value) -> Self {
        Self {
            answer: Ok(output),
            usage: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every request with the given error.
    pub fn failing(error: ProviderError) -> Self {
        Self {
            answer: Err(error),
            usage: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Load the recorded answer from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading fixture answer from: {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let output: Value = serde_json::from_str(&content)?;
        Ok(Self::new(output))
    }

    /// Report this usage with every answer.
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Number of requests received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CompletionProvider for FixtureBackend {
    fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let output = self.answer.clone()?;
        let mut response = CompletionResponse::new(output);
        if let Some(usage) = self.usage {
            response = response.with_usage(usage);
        }
        Ok(response)
    }

    fn name(&self) -> &str {
        "fixture"
    }
}
