//! Domain models for the AI service.
//!
//! Requests arrive over HTTP, payloads are the schema-validated backend
//! output, responses are what the service returns.

pub mod common;
pub mod diagnosis;
pub mod payload;
pub mod question;
pub mod symptoms;

pub use common::{PatientInfo, ResponseMeta, Symptom, UnknownVariant, UrgencyLevel};
pub use diagnosis::{
    DiagnosisAssistanceRequest, DiagnosisAssistanceResponse, DiagnosticSuggestion,
    RecommendedTest, TestPriority, TreatmentSuggestion, TreatmentType,
};
pub use payload::{DiagnosisAssistancePayload, MedicalQuestionPayload, SymptomAnalysisPayload};
pub use question::{MedicalQuestionRequest, MedicalQuestionResponse, Source, SourceType};
pub use symptoms::{Condition, SymptomAnalysisRequest, SymptomAnalysisResponse};
