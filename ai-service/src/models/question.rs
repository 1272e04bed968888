use super::common::{ResponseMeta, UnknownVariant};
use super::payload::DEFAULT_SOURCE_RELIABILITY;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

/// Request body for `POST /api/ai/medical-question`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MedicalQuestionRequest {
    #[validate(length(min = 1, max = 2000, message = "Question must be 1-2000 characters"))]
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5000, message = "Context must be at most 5000 characters"))]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SourceType {
    Guideline,
    Study,
    Textbook,
}

impl FromStr for SourceType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guideline" => Ok(SourceType::Guideline),
            "study" => Ok(SourceType::Study),
            "textbook" => Ok(SourceType::Textbook),
            _ => Err(UnknownVariant::new("source type", s)),
        }
    }
}

impl TryFrom<String> for SourceType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A reference backing an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    #[serde(default = "default_reliability")]
    pub reliability_score: f64,
}

fn default_reliability() -> f64 {
    DEFAULT_SOURCE_RELIABILITY
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalQuestionResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    pub answer: String,
    pub sources: Vec<Source>,
    pub confidence_score: f64,
    pub follow_up_questions: Vec<String>,
    pub related_topics: Vec<String>,
}
