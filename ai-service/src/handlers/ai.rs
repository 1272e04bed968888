use axum::{extract::State, Json};
use serde_json::{json, Value};
use validator::Validate;

use crate::middleware::Authenticated;
use crate::models::{
    DiagnosisAssistanceRequest, DiagnosisAssistanceResponse, MedicalQuestionRequest,
    MedicalQuestionResponse, SymptomAnalysisRequest, SymptomAnalysisResponse,
};
use crate::startup::AppState;
use service_core::error::AppError;

#[tracing::instrument(skip(state, caller, request), fields(caller = %caller.subject))]
pub async fn analyze_symptoms(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Json(request): Json<SymptomAnalysisRequest>,
) -> Result<Json<SymptomAnalysisResponse>, AppError> {
    request.validate()?;

    let response = state.assistant.analyze_symptoms(&request).await?;

    tracing::info!(
        analysis_id = %response.analysis_id,
        conditions = response.possible_conditions.len(),
        urgency = %response.urgency_level,
        "Symptom analysis completed"
    );

    Ok(Json(response))
}

#[tracing::instrument(skip(state, caller, request), fields(caller = %caller.subject))]
pub async fn medical_question(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Json(request): Json<MedicalQuestionRequest>,
) -> Result<Json<MedicalQuestionResponse>, AppError> {
    request.validate()?;

    let response = state.assistant.answer_question(&request).await?;

    tracing::info!(
        response_id = %response.meta.response_id,
        sources = response.sources.len(),
        "Medical question answered"
    );

    Ok(Json(response))
}

#[tracing::instrument(skip(state, caller, request), fields(caller = %caller.subject))]
pub async fn diagnosis_assistance(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Json(request): Json<DiagnosisAssistanceRequest>,
) -> Result<Json<DiagnosisAssistanceResponse>, AppError> {
    request.validate()?;

    let response = state.assistant.assist_diagnosis(&request).await?;

    tracing::info!(
        response_id = %response.meta.response_id,
        diagnoses = response.suggested_diagnoses.len(),
        "Diagnosis assistance completed"
    );

    Ok(Json(response))
}

/// Capabilities of this deployment. No auth.
pub async fn ai_info(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": crate::SERVICE_DISPLAY_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "model": state.config.model.model_name,
        "backend": state.config.model.backend_kind().as_str(),
        "capabilities": [
            "symptom_analysis",
            "medical_question",
            "diagnosis_assistance"
        ]
    }))
}
