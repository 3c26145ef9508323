//! OpenAI-compatible chat-completions backend with JSON Schema output.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::ProviderError;
use crate::request::{CompletionRequest, CompletionResponse, Usage};
use crate::{CompletionProvider, Result};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Backend talking to an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    schema: &'a Value,
    strict: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    refusal: Option<String>,
}

impl OpenAiBackend {
    /// Create a backend with an explicit request timeout.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::Config("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the backend at a different API root (proxies, compatible servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Model identifier sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl CompletionProvider for OpenAiBackend {
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let body = ChatRequest {
            model: &self.model,
            temperature: request.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: &request.schema_name,
                    schema: &request.schema,
                    strict: false,
                },
            },
        };

        debug!("POST {} (model {})", self.endpoint(), self.model);

        let resp = self
            .client
            .post(self.endpoint())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(status_error(status, text));
        }

        let text = resp
            .text()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        parse_chat_response(&text)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

fn status_error(status: StatusCode, body: String) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth(body),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(body),
        _ => ProviderError::Http {
            status: status.as_u16(),
            body,
        },
    }
}

/// Turn a raw chat-completions body into a structured response.
fn parse_chat_response(body: &str) -> Result<CompletionResponse> {
    let parsed: ChatResponse = serde_json::from_str(body)?;

    let message = parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| ProviderError::MalformedResponse("response has no choices".to_string()))?;

    if let Some(refusal) = message.refusal {
        return Err(ProviderError::Refused(refusal));
    }

    let content = message
        .content
        .ok_or_else(|| ProviderError::MalformedResponse("message has no content".to_string()))?;

    let output: Value = serde_json::from_str(&content)?;
    if !output.is_object() {
        return Err(ProviderError::MalformedResponse(
            "structured output is not a JSON object".to_string(),
        ));
    }

    let mut response = CompletionResponse::new(output);
    if let Some(usage) = parsed.usage {
        response = response.with_usage(usage);
    }
    Ok(response)
}
