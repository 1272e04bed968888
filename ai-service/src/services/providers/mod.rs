//! Text-generation backend abstractions and implementations.
//!
//! A provider turns a prompt into raw model text. Two variants exist: the
//! remote OpenAI-compatible backend and a deterministic stub used when no
//! credential is configured and in tests. Selection happens once at startup.

pub mod remote;
pub mod stub;

use crate::services::prompts::OutputSchema;
use async_trait::async_trait;
use thiserror::Error;

pub use remote::{RemoteConfig, RemoteTextProvider};
pub use stub::StubTextProvider;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::Authentication(_) => "authentication",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::Timeout => "timeout",
            ProviderError::NetworkError(_) => "network",
            ProviderError::ApiError(_) => "api",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::Complete => "complete",
            FinishReason::Length => "length",
        }
    }
}

/// Raw result of a provider call.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Model output, expected to hold one JSON object.
    pub text: String,

    /// Model that produced the output.
    pub model: String,

    pub input_tokens: u32,

    pub output_tokens: u32,

    pub finish_reason: FinishReason,
}

/// Generation parameters for a single call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Output schema the prompt declares.
    pub schema: OutputSchema,

    /// Sampling temperature.
    pub temperature: f32,

    /// Maximum output tokens.
    pub max_tokens: u32,
}

/// Which backend variant is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Stub,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Remote => "remote",
            BackendKind::Stub => "stub",
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" | "openai" => Ok(BackendKind::Remote),
            "stub" | "mock" => Ok(BackendKind::Stub),
            other => Err(format!(
                "unknown AI backend '{}', expected 'remote' or 'stub'",
                other
            )),
        }
    }
}

/// Trait for text-generation backends.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Backend label for logs and metrics.
    fn name(&self) -> &'static str;

    /// Generate a response for the prompt.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
