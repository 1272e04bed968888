//! The three request pipelines: build prompt, invoke model, map response.

use crate::error::AiError;
use crate::models::{
    DiagnosisAssistancePayload, DiagnosisAssistanceRequest, DiagnosisAssistanceResponse,
    MedicalQuestionPayload, MedicalQuestionRequest, MedicalQuestionResponse,
    SymptomAnalysisPayload, SymptomAnalysisRequest, SymptomAnalysisResponse,
};
use crate::services::invoker::ModelInvoker;
use crate::services::mapper::{self, EMPTY_SYMPTOMS_CONFIDENCE_CAP};
use crate::services::metrics;
use crate::services::prompts::{OutputSchema, PromptBuilder};

/// Stateless entry point for all three request kinds.
#[derive(Clone)]
pub struct MedicalAssistant {
    prompts: PromptBuilder,
    invoker: ModelInvoker,
}

impl MedicalAssistant {
    pub fn new(prompts: PromptBuilder, invoker: ModelInvoker) -> Self {
        Self { prompts, invoker }
    }

    pub fn invoker(&self) -> &ModelInvoker {
        &self.invoker
    }

    #[tracing::instrument(skip(self, request), fields(symptoms = request.symptoms.len()))]
    pub async fn analyze_symptoms(
        &self,
        request: &SymptomAnalysisRequest,
    ) -> Result<SymptomAnalysisResponse, AiError> {
        let result = self.run_symptom_analysis(request).await;
        record_outcome(OutputSchema::SymptomAnalysis, &result);
        result
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn answer_question(
        &self,
        request: &MedicalQuestionRequest,
    ) -> Result<MedicalQuestionResponse, AiError> {
        let result = self.run_medical_question(request).await;
        record_outcome(OutputSchema::MedicalQuestion, &result);
        result
    }

    #[tracing::instrument(skip(self, request), fields(symptoms = request.symptoms.len()))]
    pub async fn assist_diagnosis(
        &self,
        request: &DiagnosisAssistanceRequest,
    ) -> Result<DiagnosisAssistanceResponse, AiError> {
        let result = self.run_diagnosis_assistance(request).await;
        record_outcome(OutputSchema::DiagnosisAssistance, &result);
        result
    }

    async fn run_symptom_analysis(
        &self,
        request: &SymptomAnalysisRequest,
    ) -> Result<SymptomAnalysisResponse, AiError> {
        let prompt = self.prompts.symptom_analysis(request);
        let payload: SymptomAnalysisPayload = self.invoker.invoke(&prompt).await?;
        let mut response = mapper::symptom_analysis(payload);

        if request.symptoms.is_empty() {
            tracing::warn!("No symptoms given; returning a low-confidence analysis");
            response.confidence_score = response.confidence_score.min(EMPTY_SYMPTOMS_CONFIDENCE_CAP);
        }

        Ok(response)
    }

    async fn run_medical_question(
        &self,
        request: &MedicalQuestionRequest,
    ) -> Result<MedicalQuestionResponse, AiError> {
        if request.question.trim().is_empty() {
            return Err(AiError::Validation("question must not be blank".to_string()));
        }

        let prompt = self.prompts.medical_question(request);
        let payload: MedicalQuestionPayload = self.invoker.invoke(&prompt).await?;
        Ok(mapper::medical_question(payload))
    }

    async fn run_diagnosis_assistance(
        &self,
        request: &DiagnosisAssistanceRequest,
    ) -> Result<DiagnosisAssistanceResponse, AiError> {
        let prompt = self.prompts.diagnosis_assistance(request);
        let payload: DiagnosisAssistancePayload = self.invoker.invoke(&prompt).await?;
        Ok(mapper::diagnosis_assistance(payload))
    }
}

fn record_outcome<T>(schema: OutputSchema, result: &Result<T, AiError>) {
    match result {
        Ok(_) => metrics::record_request(schema.as_str(), "success"),
        Err(e) => {
            tracing::warn!(schema = %schema, error = %e, "AI pipeline failed");
            metrics::record_request(schema.as_str(), e.kind());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Symptom, UrgencyLevel};
    use crate::services::providers::StubTextProvider;
    use std::sync::Arc;

    fn assistant() -> MedicalAssistant {
        MedicalAssistant::new(
            PromptBuilder::new("Czech"),
            ModelInvoker::new(Arc::new(StubTextProvider::new()), 0.3, 1000),
        )
    }

    #[tokio::test]
    async fn symptom_analysis_produces_bounded_response() {
        let request = SymptomAnalysisRequest {
            symptoms: vec![Symptom::named("bolest hlavy"), Symptom::named("horečka")],
            ..Default::default()
        };

        let response = assistant().analyze_symptoms(&request).await.unwrap();
        assert!(!response.possible_conditions.is_empty());
        assert!(matches!(
            response.urgency_level,
            UrgencyLevel::Low | UrgencyLevel::Medium | UrgencyLevel::High | UrgencyLevel::Critical
        ));
        assert!((0.0..=1.0).contains(&response.confidence_score));
    }

    #[tokio::test]
    async fn empty_symptoms_give_low_confidence() {
        let response = assistant()
            .analyze_symptoms(&SymptomAnalysisRequest::default())
            .await
            .unwrap();
        assert!(response.confidence_score <= EMPTY_SYMPTOMS_CONFIDENCE_CAP);
        assert!(response.meta.success);
    }

    #[tokio::test]
    async fn identical_requests_get_distinct_ids() {
        let assistant = assistant();
        let request = SymptomAnalysisRequest {
            symptoms: vec![Symptom::named("cough")],
            ..Default::default()
        };

        let first = assistant.analyze_symptoms(&request).await.unwrap();
        let second = assistant.analyze_symptoms(&request).await.unwrap();
        assert_ne!(first.analysis_id, second.analysis_id);
    }

    #[tokio::test]
    async fn blank_question_is_a_validation_error() {
        let request = MedicalQuestionRequest {
            question: "   ".to_string(),
            context: None,
            specialization: None,
        };
        let err = assistant().answer_question(&request).await.unwrap_err();
        assert!(matches!(err, AiError::Validation(_)));
    }

    #[tokio::test]
    async fn diagnosis_assistance_maps_all_sections() {
        let response = assistant()
            .assist_diagnosis(&DiagnosisAssistanceRequest::default())
            .await
            .unwrap();
        assert_eq!(response.suggested_diagnoses.len(), 1);
        assert_eq!(response.recommended_tests.len(), 1);
        assert_eq!(response.treatment_suggestions.len(), 1);
    }
}
