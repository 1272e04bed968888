//! Deterministic stand-in backend.
//!
//! Returns one canned payload per output schema. The payload is chosen from
//! the schema carried in [`GenerationParams`], never from prompt wording.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use crate::services::prompts::OutputSchema;
use async_trait::async_trait;
use serde_json::{json, Value};

pub const STUB_MODEL: &str = "deterministic-stub";

#[derive(Debug, Clone, Default)]
pub struct StubTextProvider;

impl StubTextProvider {
    pub fn new() -> Self {
        Self
    }

    /// The canned payload for a schema.
    pub fn payload(schema: OutputSchema) -> Value {
        match schema {
            OutputSchema::SymptomAnalysis => json!({
                "possible_conditions": [
                    {
                        "name": "Virová infekce",
                        "probability": 0.6,
                        "description": "Běžná virová infekce dýchacích cest",
                        "severity": "low"
                    }
                ],
                "recommendations": ["Odpočinek", "Zvýšený příjem tekutin"],
                "urgency_level": "low",
                "confidence_score": 0.7,
                "should_seek_immediate_care": false
            }),
            OutputSchema::MedicalQuestion => json!({
                "answer": "Detailní odpověď na lékařskou otázku založená na aktuálních guidelines.",
                "sources": [
                    {
                        "title": "ESC Guidelines 2024",
                        "type": "guideline",
                        "reliability_score": 0.95
                    }
                ],
                "confidence_score": 0.85,
                "follow_up_questions": ["Jaké jsou rizikové faktory?"],
                "related_topics": ["Prevence", "Léčba"]
            }),
            OutputSchema::DiagnosisAssistance => json!({
                "suggested_diagnoses": [
                    {
                        "diagnosis": "Funkční porucha",
                        "icd_code": "K59.0",
                        "probability": 0.5,
                        "supporting_evidence": ["Anamnéza"],
                        "contradicting_evidence": []
                    }
                ],
                "recommended_tests": [
                    {
                        "test_name": "Základní biochemie",
                        "priority": "routine",
                        "reason": "Vyloučení organické příčiny"
                    }
                ],
                "treatment_suggestions": [
                    {
                        "treatment": "Symptomatická léčba",
                        "type": "medication",
                        "priority": "střední"
                    }
                ],
                "confidence_score": 0.6
            }),
        }
    }
}

#[async_trait]
impl TextProvider for StubTextProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        let text = Self::payload(params.schema).to_string();
        let output_tokens = (text.len() / 4) as u32;

        Ok(ProviderResponse {
            text,
            model: STUB_MODEL.to_string(),
            input_tokens: (prompt.len() / 4) as u32,
            output_tokens,
            finish_reason: FinishReason::Complete,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
