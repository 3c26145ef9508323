//! Error types for the provider layer.

use thiserror::Error;

/// Errors that can occur while requesting a structured completion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The backend is misconfigured (missing credential, bad endpoint).
    #[error("provider configuration error: {0}")]
    Config(String),

    /// The request never produced an HTTP response (connect, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider rejected the credential.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The provider is throttling requests.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The model declined to produce the requested structure.
    #[error("provider refused the request: {0}")]
    Refused(String),

    /// The response body or its content was not the expected JSON.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// Failed to read a fixture file.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ProviderError {
    fn from(err: std::io::Error) -> Self {
        ProviderError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::MalformedResponse(err.to_string())
    }
}
