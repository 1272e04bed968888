//! Types shared by all three request kinds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// A free-text value that does not belong to a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized {kind} value '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Clinical priority, used both for condition severity and overall urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl FromStr for UrgencyLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(UrgencyLevel::Low),
            "medium" => Ok(UrgencyLevel::Medium),
            "high" => Ok(UrgencyLevel::High),
            "critical" => Ok(UrgencyLevel::Critical),
            _ => Err(UnknownVariant::new("urgency", s)),
        }
    }
}

impl TryFrom<String> for UrgencyLevel {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrgencyLevel::Low => write!(f, "low"),
            UrgencyLevel::Medium => write!(f, "medium"),
            UrgencyLevel::High => write!(f, "high"),
            UrgencyLevel::Critical => write!(f, "critical"),
        }
    }
}

/// A reported symptom.
///
/// Accepts either a bare name (`"fever"`) or an object with optional
/// severity and duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SymptomRepr")]
pub struct Symptom {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl Symptom {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            severity: None,
            duration: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SymptomRepr {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        severity: Option<String>,
        #[serde(default)]
        duration: Option<String>,
    },
}

impl From<SymptomRepr> for Symptom {
    fn from(repr: SymptomRepr) -> Self {
        match repr {
            SymptomRepr::Name(name) => Symptom::named(name),
            SymptomRepr::Detailed {
                name,
                severity,
                duration,
            } => Symptom {
                name,
                severity: non_empty(severity),
                duration: non_empty(duration),
            },
        }
    }
}

/// What is known about the patient. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    #[serde(
        default,
        deserialize_with = "deserialize_age",
        skip_serializing_if = "Option::is_none"
    )]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub medical_history: Vec<String>,
}

impl PatientInfo {
    pub fn is_empty(&self) -> bool {
        self.age.is_none() && self.gender.is_none() && self.medical_history.is_empty()
    }

    /// Combine a nested `patient_info` object with the flat legacy fields.
    /// Nested values win; flat values only fill gaps.
    pub(crate) fn resolve(
        nested: Option<&PatientInfo>,
        age: Option<u32>,
        gender: Option<&String>,
        medical_history: &[String],
    ) -> Option<PatientInfo> {
        let mut info = nested.cloned().unwrap_or_default();
        info.gender = non_empty(info.gender);

        if info.age.is_none() {
            info.age = age;
        }
        if info.gender.is_none() {
            info.gender = non_empty(gender.cloned());
        }
        if info.medical_history.is_empty() {
            info.medical_history = medical_history.to_vec();
        }

        (!info.is_empty()).then_some(info)
    }
}

/// Deserialize an age leniently: non-positive or out-of-range values become
/// "unknown" instead of failing the request.
pub(crate) fn deserialize_age<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.and_then(|age| match u32::try_from(age) {
        Ok(age) if age > 0 => Some(age),
        _ => {
            tracing::warn!(age, "Ignoring invalid patient age");
            None
        }
    }))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Fields every response carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub response_id: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
}

impl ResponseMeta {
    pub fn new(response_id: String) -> Self {
        Self {
            response_id,
            timestamp: Utc::now(),
            success: true,
        }
    }
}
