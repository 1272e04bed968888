//! Schema-validated backend output.
//!
//! These are the three output schemas the prompts declare. Deserializing a
//! backend object into one of them is the validation step: list entries
//! missing a required key, wrong value types, or enum values outside the
//! closed sets all fail here. Top-level keys fall back to the defaults below.

use super::{Condition, DiagnosticSuggestion, RecommendedTest, Source, TreatmentSuggestion, UrgencyLevel};
use serde::Deserialize;

pub const DEFAULT_SYMPTOM_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_QUESTION_CONFIDENCE: f64 = 0.7;
pub const DEFAULT_DIAGNOSIS_CONFIDENCE: f64 = 0.6;
pub const DEFAULT_SOURCE_RELIABILITY: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SymptomAnalysisPayload {
    #[serde(default)]
    pub possible_conditions: Vec<Condition>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default = "default_urgency")]
    pub urgency_level: UrgencyLevel,
    #[serde(default = "default_symptom_confidence")]
    pub confidence_score: f64,
    #[serde(default)]
    pub should_seek_immediate_care: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MedicalQuestionPayload {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default = "default_question_confidence")]
    pub confidence_score: f64,
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
    #[serde(default)]
    pub related_topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiagnosisAssistancePayload {
    #[serde(default)]
    pub suggested_diagnoses: Vec<DiagnosticSuggestion>,
    #[serde(default)]
    pub recommended_tests: Vec<RecommendedTest>,
    #[serde(default)]
    pub treatment_suggestions: Vec<TreatmentSuggestion>,
    #[serde(default)]
    pub referral_recommendations: Vec<String>,
    #[serde(default = "default_diagnosis_confidence")]
    pub confidence_score: f64,
}

fn default_urgency() -> UrgencyLevel {
    UrgencyLevel::Low
}

fn default_symptom_confidence() -> f64 {
    DEFAULT_SYMPTOM_CONFIDENCE
}

fn default_question_confidence() -> f64 {
    DEFAULT_QUESTION_CONFIDENCE
}

fn default_diagnosis_confidence() -> f64 {
    DEFAULT_DIAGNOSIS_CONFIDENCE
}
