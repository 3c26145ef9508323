//! Request and response types exchanged with a completion provider.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single schema-guided completion request.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// Name the schema is registered under on the provider side.
    pub schema_name: String,

    /// JSON Schema the answer must conform to.
    pub schema: Value,

    /// System instructions.
    pub system: String,

    /// User input (the raw document text).
    pub user: String,

    /// Sampling temperature.
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(schema_name: impl Into<String>, schema: Value) -> Self {
        Self {
            schema_name: schema_name.into(),
            schema,
            system: String::new(),
            user: String::new(),
            temperature: 0.0,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// The provider's structured answer.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// JSON object shaped (best-effort) to the requested schema.
    pub output: Value,

    /// Token usage, when the provider reports it.
    pub usage: Option<Usage>,
}

impl CompletionResponse {
    pub fn new(output: Value) -> Self {
        Self { output, usage: None }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Total tokens consumed, if reported.
    pub fn total_tokens(&self) -> Option<u32> {
        self.usage.map(|u| u.total_tokens)
    }
}
