//! Domain errors for the response synthesis pipeline.

use crate::services::providers::ProviderError;
use crate::services::prompts::OutputSchema;
use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    /// The request is unusable even under soft validation.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The text-generation backend failed or returned something that is not
    /// a JSON object.
    #[error("AI backend invocation failed: {0}")]
    BackendInvocation(#[from] ProviderError),

    /// The backend returned a JSON object that does not satisfy the schema.
    #[error("Malformed {schema} output from AI backend: {reason}")]
    MalformedModelOutput {
        schema: OutputSchema,
        reason: String,
    },
}

impl AiError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AiError::Validation(_) => "validation",
            AiError::BackendInvocation(_) => "backend",
            AiError::MalformedModelOutput { .. } => "malformed_output",
        }
    }
}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::Validation(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            AiError::BackendInvocation(e) => {
                tracing::error!(error = %e, "AI backend invocation failed");
                AppError::BadGateway("AI backend invocation failed".to_string())
            }
            AiError::MalformedModelOutput { schema, reason } => {
                tracing::error!(%schema, %reason, "AI backend returned malformed output");
                AppError::BadGateway(format!("AI backend returned malformed {} output", schema))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn backend_failures_do_not_leak_details() {
        let err = AiError::BackendInvocation(ProviderError::Authentication(
            "invalid api key sk-123".to_string(),
        ));
        let app_err = AppError::from(err);
        assert_eq!(app_err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(!app_err.to_string().contains("sk-123"));
    }

    #[test]
    fn malformed_output_names_schema() {
        let err = AiError::MalformedModelOutput {
            schema: OutputSchema::DiagnosisAssistance,
            reason: "missing field `test_name`".to_string(),
        };
        let app_err = AppError::from(err);
        assert_eq!(app_err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(app_err.to_string().contains("diagnosis_assistance"));
    }

    #[test]
    fn validation_is_a_client_error() {
        let app_err = AppError::from(AiError::Validation("question is blank".to_string()));
        assert_eq!(app_err.status_code(), StatusCode::BAD_REQUEST);
    }
}
