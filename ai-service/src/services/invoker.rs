//! Model invocation and output schema validation.

use crate::error::AiError;
use crate::services::metrics;
use crate::services::prompts::{OutputSchema, Prompt};
use crate::services::providers::{FinishReason, GenerationParams, ProviderError, TextProvider};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;

/// Calls the configured backend once per prompt and turns its text into a
/// schema-validated value. No retries.
#[derive(Clone)]
pub struct ModelInvoker {
    provider: Arc<dyn TextProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl ModelInvoker {
    pub fn new(provider: Arc<dyn TextProvider>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }

    pub fn provider(&self) -> &Arc<dyn TextProvider> {
        &self.provider
    }

    /// Invoke the backend and validate its output against the prompt's schema.
    pub async fn invoke<T: DeserializeOwned>(&self, prompt: &Prompt) -> Result<T, AiError> {
        let raw = self.invoke_raw(prompt).await?;
        validate_payload(prompt.schema, raw)
    }

    /// Invoke the backend and return its output as a JSON object.
    #[tracing::instrument(skip(self, prompt), fields(provider = self.provider.name(), schema = %prompt.schema))]
    pub async fn invoke_raw(&self, prompt: &Prompt) -> Result<Map<String, Value>, AiError> {
        let params = GenerationParams {
            schema: prompt.schema,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let provider = self.provider.name();

        let start = Instant::now();
        let result = self.provider.generate(&prompt.text, &params).await;
        metrics::record_provider_latency(provider, start.elapsed().as_secs_f64());

        let response = result.map_err(|e| {
            metrics::record_provider_error(provider, e.kind());
            tracing::warn!(error = %e, "Text-generation backend call failed");
            AiError::BackendInvocation(e)
        })?;

        metrics::record_tokens(&response.model, response.input_tokens, response.output_tokens);
        tracing::info!(
            model = %response.model,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            finish_reason = response.finish_reason.as_str(),
            "Text-generation backend responded"
        );

        extract_json_object(&response.text).map_err(|e| {
            if response.finish_reason == FinishReason::Length {
                tracing::warn!("Backend output hit the token limit before the JSON was complete");
            }
            metrics::record_provider_error(provider, e.kind());
            AiError::BackendInvocation(e)
        })
    }
}

/// Deserialize a backend object into the typed payload for `schema`.
pub fn validate_payload<T: DeserializeOwned>(
    schema: OutputSchema,
    raw: Map<String, Value>,
) -> Result<T, AiError> {
    serde_json::from_value(Value::Object(raw)).map_err(|e| AiError::MalformedModelOutput {
        schema,
        reason: e.to_string(),
    })
}

/// Pull the single JSON object out of model text. Tolerates Markdown code
/// fences and prose around the object.
pub(crate) fn extract_json_object(text: &str) -> Result<Map<String, Value>, ProviderError> {
    let trimmed = strip_code_fence(text.trim());

    let value = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value,
        Err(first_err) => {
            let start = trimmed.find('{');
            let end = trimmed.rfind('}');
            match (start, end) {
                (Some(start), Some(end)) if start < end => {
                    serde_json::from_str::<Value>(&trimmed[start..=end]).map_err(|e| {
                        ProviderError::InvalidResponse(format!("output is not valid JSON: {}", e))
                    })?
                }
                _ => {
                    return Err(ProviderError::InvalidResponse(format!(
                        "output is not valid JSON: {}",
                        first_err
                    )))
                }
            }
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ProviderError::InvalidResponse(format!(
            "expected a JSON object, got {}",
            json_type(&other)
        ))),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag line, e.g. ```json
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SymptomAnalysisPayload;
    use crate::services::providers::{ProviderResponse, StubTextProvider};
    use async_trait::async_trait;

    struct CannedProvider(Result<String, fn() -> ProviderError>);

    #[async_trait]
    impl TextProvider for CannedProvider {
        fn name(&self) -> &'static str {
            "canned"
        }

        async fn generate(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<ProviderResponse, ProviderError> {
            match &self.0 {
                Ok(text) => Ok(ProviderResponse {
                    text: text.clone(),
                    model: "canned".to_string(),
                    input_tokens: 1,
                    output_tokens: 1,
                    finish_reason: FinishReason::Complete,
                }),
                Err(make) => Err(make()),
            }
        }

        async fn health_check(&self) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    fn invoker(provider: impl TextProvider + 'static) -> ModelInvoker {
        ModelInvoker::new(Arc::new(provider), 0.3, 1000)
    }

    fn symptom_prompt() -> Prompt {
        Prompt {
            text: "Symptoms: cough".to_string(),
            schema: OutputSchema::SymptomAnalysis,
        }
    }

    #[test]
    fn extracts_fenced_json() {
        let map = extract_json_object("```json\n{\"confidence_score\": 0.4}\n```").unwrap();
        assert_eq!(map["confidence_score"], 0.4);
    }

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let map = extract_json_object("Here you go: {\"answer\": \"ok\"} Hope it helps.").unwrap();
        assert_eq!(map["answer"], "ok");
    }

    #[test]
    fn rejects_non_object_json() {
        let err = extract_json_object("[1, 2, 3]").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn rejects_plain_text() {
        assert!(matches!(
            extract_json_object("I cannot help with that."),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn stub_output_validates() {
        let payload: SymptomAnalysisPayload = invoker(StubTextProvider::new())
            .invoke(&symptom_prompt())
            .await
            .unwrap();
        assert!(!payload.possible_conditions.is_empty());
    }

    #[tokio::test]
    async fn provider_failure_becomes_backend_invocation_error() {
        let err = invoker(CannedProvider(Err(|| ProviderError::Timeout)))
            .invoke::<SymptomAnalysisPayload>(&symptom_prompt())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AiError::BackendInvocation(ProviderError::Timeout)
        ));
    }

    #[tokio::test]
    async fn unparseable_output_becomes_backend_invocation_error() {
        let err = invoker(CannedProvider(Ok("not json".to_string())))
            .invoke::<SymptomAnalysisPayload>(&symptom_prompt())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AiError::BackendInvocation(ProviderError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn incomplete_entry_becomes_malformed_output() {
        let text = r#"{"possible_conditions": [{"name": "Flu", "probability": 0.4}]}"#;
        let err = invoker(CannedProvider(Ok(text.to_string())))
            .invoke::<SymptomAnalysisPayload>(&symptom_prompt())
            .await
            .unwrap_err();

        match err {
            AiError::MalformedModelOutput { schema, reason } => {
                assert_eq!(schema, OutputSchema::SymptomAnalysis);
                assert!(reason.contains("description"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn unknown_urgency_becomes_malformed_output() {
        let text = r#"{"urgency_level": "urgent-ish"}"#;
        let err = invoker(CannedProvider(Ok(text.to_string())))
            .invoke::<SymptomAnalysisPayload>(&symptom_prompt())
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::MalformedModelOutput { .. }));
    }
}
