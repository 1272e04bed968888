use super::common::{deserialize_age, PatientInfo, ResponseMeta, Symptom, UnknownVariant};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

/// Request body for `POST /api/ai/diagnosis-assistance`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DiagnosisAssistanceRequest {
    #[serde(default)]
    #[validate(length(max = 50, message = "At most 50 symptoms can be analyzed at once"))]
    pub symptoms: Vec<Symptom>,
    #[serde(default, alias = "patient_data", skip_serializing_if = "Option::is_none")]
    pub patient_info: Option<PatientInfo>,
    #[serde(
        default,
        deserialize_with = "deserialize_age",
        skip_serializing_if = "Option::is_none"
    )]
    pub patient_age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_gender: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub medical_history: Vec<String>,
    /// Free-form lab/test results, embedded into the prompt as-is.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_results: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5000, message = "Clinical notes must be at most 5000 characters"))]
    pub clinical_notes: Option<String>,
}

impl DiagnosisAssistanceRequest {
    pub fn patient(&self) -> Option<PatientInfo> {
        PatientInfo::resolve(
            self.patient_info.as_ref(),
            self.patient_age,
            self.patient_gender.as_ref(),
            &self.medical_history,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticSuggestion {
    pub diagnosis: String,
    #[serde(default)]
    pub icd_code: Option<String>,
    pub probability: f64,
    #[serde(default)]
    pub supporting_evidence: Vec<String>,
    #[serde(default)]
    pub contradicting_evidence: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TestPriority {
    Urgent,
    Routine,
    Optional,
}

impl FromStr for TestPriority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "urgent" => Ok(TestPriority::Urgent),
            "routine" => Ok(TestPriority::Routine),
            "optional" => Ok(TestPriority::Optional),
            _ => Err(UnknownVariant::new("test priority", s)),
        }
    }
}

impl TryFrom<String> for TestPriority {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedTest {
    pub test_name: String,
    pub priority: TestPriority,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TreatmentType {
    Medication,
    Procedure,
    Lifestyle,
}

impl FromStr for TreatmentType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "medication" => Ok(TreatmentType::Medication),
            "procedure" => Ok(TreatmentType::Procedure),
            "lifestyle" => Ok(TreatmentType::Lifestyle),
            _ => Err(UnknownVariant::new("treatment type", s)),
        }
    }
}

impl TryFrom<String> for TreatmentType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentSuggestion {
    pub treatment: String,
    #[serde(rename = "type")]
    pub treatment_type: TreatmentType,
    /// Free text; the model answers in the configured language.
    pub priority: String,
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub monitoring_required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisAssistanceResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    pub suggested_diagnoses: Vec<DiagnosticSuggestion>,
    pub recommended_tests: Vec<RecommendedTest>,
    pub treatment_suggestions: Vec<TreatmentSuggestion>,
    #[serde(default)]
    pub referral_recommendations: Vec<String>,
    pub confidence_score: f64,
}
