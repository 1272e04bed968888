use super::common::{deserialize_age, PatientInfo, ResponseMeta, Symptom, UrgencyLevel};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body for `POST /api/ai/analyze-symptoms`.
///
/// An empty symptom list is allowed and handled as a best-effort analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SymptomAnalysisRequest {
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
}

impl SymptomAnalysisRequest {
    /// Patient details from either the nested object or the flat fields.
    pub fn patient(&self) -> Option<PatientInfo> {
        PatientInfo::resolve(
            self.patient_info.as_ref(),
            self.patient_age,
            self.patient_gender.as_ref(),
            &self.medical_history,
        )
    }
}

/// A possible condition suggested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    pub probability: f64,
    pub description: String,
    pub severity: UrgencyLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomAnalysisResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    pub analysis_id: String,
    pub possible_conditions: Vec<Condition>,
    pub recommendations: Vec<String>,
    pub urgency_level: UrgencyLevel,
    pub confidence_score: f64,
    pub disclaimer: String,
    pub should_seek_immediate_care: bool,
}
