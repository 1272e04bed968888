mod common;

use ai_service::models::DiagnosisAssistanceResponse;
use common::TestApp;
use serde_json::{json, Value};

const PATH: &str = "/api/ai/diagnosis-assistance";

#[tokio::test]
async fn diagnosis_assistance_returns_suggestions() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            PATH,
            &json!({
                "symptoms": ["bolest břicha"],
                "patient_data": { "age": 52, "gender": "female" },
                "test_results": [{ "name": "CRP", "value": 12 }],
                "clinical_notes": "Bolest trvá týden."
            }),
        )
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(!body["suggested_diagnoses"].as_array().unwrap().is_empty());
    let priority = body["recommended_tests"][0]["priority"].as_str().unwrap();
    assert!(["urgent", "routine", "optional"].contains(&priority));
    assert_eq!(body["treatment_suggestions"][0]["type"], "medication");

    let parsed: DiagnosisAssistanceResponse = serde_json::from_value(body.clone()).unwrap();
    assert_eq!(serde_json::to_value(&parsed).unwrap(), body);
}

#[tokio::test]
async fn diagnosis_assistance_requires_authorization() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json_anonymous(PATH, &json!({ "symptoms": ["únava"] }))
        .await;

    assert_eq!(response.status(), 403);
}
