//! Validated payload -> response entity.
//!
//! Every response gets a fresh identifier and timestamp. Scores are clamped
//! to `[0, 1]`.

use crate::models::{
    Condition, DiagnosisAssistancePayload, DiagnosisAssistanceResponse, DiagnosticSuggestion,
    MedicalQuestionPayload, MedicalQuestionResponse, ResponseMeta, Source,
    SymptomAnalysisPayload, SymptomAnalysisResponse,
};
use chrono::Utc;
use uuid::Uuid;

pub const DISCLAIMER: &str =
    "Tato analýza slouží pouze jako pomocný nástroj a nenahrazuje lékařské vyšetření.";

/// Confidence ceiling for an analysis that had no symptoms to work with.
pub const EMPTY_SYMPTOMS_CONFIDENCE_CAP: f64 = 0.2;

/// `analysis_<YYYYMMDD_HHMMSS>_<8 hex>`
pub fn new_analysis_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "analysis_{}_{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        &suffix[..8]
    )
}

pub fn new_response_id() -> String {
    Uuid::new_v4().to_string()
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

pub fn symptom_analysis(payload: SymptomAnalysisPayload) -> SymptomAnalysisResponse {
    let analysis_id = new_analysis_id();

    SymptomAnalysisResponse {
        meta: ResponseMeta::new(analysis_id.clone()),
        analysis_id,
        possible_conditions: payload
            .possible_conditions
            .into_iter()
            .map(|condition| Condition {
                probability: clamp_unit(condition.probability),
                ..condition
            })
            .collect(),
        recommendations: payload.recommendations,
        urgency_level: payload.urgency_level,
        confidence_score: clamp_unit(payload.confidence_score),
        disclaimer: DISCLAIMER.to_string(),
        should_seek_immediate_care: payload.should_seek_immediate_care,
    }
}

pub fn medical_question(payload: MedicalQuestionPayload) -> MedicalQuestionResponse {
    MedicalQuestionResponse {
        meta: ResponseMeta::new(new_response_id()),
        answer: payload.answer,
        sources: payload
            .sources
            .into_iter()
            .map(|source| Source {
                reliability_score: clamp_unit(source.reliability_score),
                ..source
            })
            .collect(),
        confidence_score: clamp_unit(payload.confidence_score),
        follow_up_questions: payload.follow_up_questions,
        related_topics: payload.related_topics,
    }
}

pub fn diagnosis_assistance(payload: DiagnosisAssistancePayload) -> DiagnosisAssistanceResponse {
    DiagnosisAssistanceResponse {
        meta: ResponseMeta::new(new_response_id()),
        suggested_diagnoses: payload
            .suggested_diagnoses
            .into_iter()
            .map(|suggestion| DiagnosticSuggestion {
                probability: clamp_unit(suggestion.probability),
                icd_code: suggestion.icd_code.filter(|code| !code.trim().is_empty()),
                ..suggestion
            })
            .collect(),
        recommended_tests: payload.recommended_tests,
        treatment_suggestions: payload.treatment_suggestions,
        referral_recommendations: payload.referral_recommendations,
        confidence_score: clamp_unit(payload.confidence_score),
    }
}
