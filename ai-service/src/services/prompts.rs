//! Prompt rendering.
//!
//! Each request kind renders into one instruction string: role line, the
//! request fields in a fixed order, the expected JSON output schema, and the
//! language/tone instruction. Rendering is pure and never fails; missing
//! optional fields are omitted or replaced by a placeholder.

use crate::models::{
    DiagnosisAssistanceRequest, MedicalQuestionRequest, PatientInfo, Symptom,
    SymptomAnalysisRequest,
};

const NO_SYMPTOMS: &str = "none reported";
const UNKNOWN: &str = "unknown";
const NO_CONTEXT: &str = "No specific context";
const GENERAL_MEDICINE: &str = "General medicine";

/// The output schema a prompt asks the backend to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputSchema {
    SymptomAnalysis,
    MedicalQuestion,
    DiagnosisAssistance,
}

impl OutputSchema {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSchema::SymptomAnalysis => "symptom_analysis",
            OutputSchema::MedicalQuestion => "medical_question",
            OutputSchema::DiagnosisAssistance => "diagnosis_assistance",
        }
    }

    /// JSON skeleton embedded in the prompt.
    pub fn format_description(&self) -> &'static str {
        match self {
            OutputSchema::SymptomAnalysis => SYMPTOM_ANALYSIS_FORMAT,
            OutputSchema::MedicalQuestion => MEDICAL_QUESTION_FORMAT,
            OutputSchema::DiagnosisAssistance => DIAGNOSIS_ASSISTANCE_FORMAT,
        }
    }
}

impl std::fmt::Display for OutputSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const SYMPTOM_ANALYSIS_FORMAT: &str = r#"{
    "possible_conditions": [
        {
            "name": "condition name",
            "probability": 0.7,
            "description": "short description",
            "severity": "low/medium/high/critical"
        }
    ],
    "recommendations": ["recommendation 1", "recommendation 2"],
    "urgency_level": "low/medium/high/critical",
    "confidence_score": 0.8,
    "should_seek_immediate_care": false
}"#;

const MEDICAL_QUESTION_FORMAT: &str = r#"{
    "answer": "detailed answer",
    "sources": [
        {
            "title": "source title",
            "type": "guideline/study/textbook",
            "reliability_score": 0.9
        }
    ],
    "confidence_score": 0.8,
    "follow_up_questions": ["question 1", "question 2"],
    "related_topics": ["topic 1", "topic 2"]
}"#;

const DIAGNOSIS_ASSISTANCE_FORMAT: &str = r#"{
    "suggested_diagnoses": [
        {
            "diagnosis": "diagnosis name",
            "icd_code": "ICD-10 code",
            "probability": 0.7,
            "supporting_evidence": ["evidence 1"],
            "contradicting_evidence": ["counter-evidence 1"]
        }
    ],
    "recommended_tests": [
        {
            "test_name": "test name",
            "priority": "urgent/routine/optional",
            "reason": "reason"
        }
    ],
    "treatment_suggestions": [
        {
            "treatment": "treatment",
            "type": "medication/procedure/lifestyle",
            "priority": "high/medium/low"
        }
    ],
    "referral_recommendations": ["referral 1"],
    "confidence_score": 0.8
}"#;

/// A rendered prompt and the schema its answer must follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub schema: OutputSchema,
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    language: String,
}

impl PromptBuilder {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    pub fn symptom_analysis(&self, request: &SymptomAnalysisRequest) -> Prompt {
        let mut text = String::from(
            "As a healthcare AI assistant, analyze the following symptoms and provide a structured answer.\n\n",
        );
        text.push_str(&format!("Symptoms: {}\n\n", render_symptoms(&request.symptoms)));

        text.push_str("Patient information:\n");
        match request.patient() {
            Some(patient) => push_known_patient_fields(&mut text, &patient),
            None => text.push_str("- not provided\n"),
        }

        self.finish(
            text,
            OutputSchema::SymptomAnalysis,
            "be conservative with diagnoses",
        )
    }

    pub fn medical_question(&self, request: &MedicalQuestionRequest) -> Prompt {
        let mut text = String::from(
            "As a healthcare AI assistant, answer the following medical question.\n\n",
        );
        text.push_str(&format!("Question: {}\n\n", request.question.trim()));
        text.push_str(&format!(
            "Context: {}\n",
            non_blank(request.context.as_deref()).unwrap_or(NO_CONTEXT)
        ));
        text.push_str(&format!(
            "Specialization: {}\n",
            non_blank(request.specialization.as_deref()).unwrap_or(GENERAL_MEDICINE)
        ));

        self.finish(
            text,
            OutputSchema::MedicalQuestion,
            "be precise with medical information",
        )
    }

    pub fn diagnosis_assistance(&self, request: &DiagnosisAssistanceRequest) -> Prompt {
        let mut text = String::from(
            "As a diagnostic AI assistant, provide diagnostic assistance for the following case.\n\n",
        );
        text.push_str(&format!("Symptoms: {}\n\n", render_symptoms(&request.symptoms)));

        // Age and gender always get a slot here, "unknown" when absent.
        let patient = request.patient().unwrap_or_default();
        text.push_str("Patient information:\n");
        match patient.age {
            Some(age) => text.push_str(&format!("- Age: {} years\n", age)),
            None => text.push_str(&format!("- Age: {}\n", UNKNOWN)),
        }
        text.push_str(&format!(
            "- Gender: {}\n",
            patient.gender.as_deref().unwrap_or(UNKNOWN)
        ));
        if !patient.medical_history.is_empty() {
            text.push_str(&format!(
                "- Medical history: {}\n",
                patient.medical_history.join(", ")
            ));
        }

        if !request.test_results.is_empty() {
            text.push_str(&format!(
                "\nTest results ({} results):\n",
                request.test_results.len()
            ));
            for result in &request.test_results {
                text.push_str(&format!("- {}\n", render_test_result(result)));
            }
        }

        if let Some(notes) = non_blank(request.clinical_notes.as_deref()) {
            text.push_str(&format!("\nClinical notes: {}\n", notes));
        }

        self.finish(
            text,
            OutputSchema::DiagnosisAssistance,
            "base every suggestion only on the data provided",
        )
    }

    fn finish(&self, mut text: String, schema: OutputSchema, tone: &str) -> Prompt {
        text.push_str("\nRequired response format (JSON only, no other text):\n");
        text.push_str(schema.format_description());
        text.push_str(&format!(
            "\n\nRespond in {} and {}.\n",
            self.language, tone
        ));

        Prompt { text, schema }
    }
}

fn render_symptoms(symptoms: &[Symptom]) -> String {
    if symptoms.is_empty() {
        return NO_SYMPTOMS.to_string();
    }

    symptoms
        .iter()
        .map(|symptom| {
            let details: Vec<String> = [
                symptom.severity.as_ref().map(|s| format!("severity: {}", s)),
                symptom.duration.as_ref().map(|d| format!("duration: {}", d)),
            ]
            .into_iter()
            .flatten()
            .collect();

            if details.is_empty() {
                symptom.name.clone()
            } else {
                format!("{} ({})", symptom.name, details.join(", "))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_known_patient_fields(text: &mut String, patient: &PatientInfo) {
    if let Some(age) = patient.age {
        text.push_str(&format!("- Age: {} years\n", age));
    }
    if let Some(gender) = &patient.gender {
        text.push_str(&format!("- Gender: {}\n", gender));
    }
    if !patient.medical_history.is_empty() {
        text.push_str(&format!(
            "- Medical history: {}\n",
            patient.medical_history.join(", ")
        ));
    }
}

fn render_test_result(result: &serde_json::Value) -> String {
    match result {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
