use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Qualitative severity tier attached to a disease record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    #[strum(serialize = "Very High")]
    VeryHigh,
    #[serde(other)]
    Unknown,
}

/// Actionability signal derived from severity and confidence.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    pub chemical: String,
    pub organic: String,
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPrediction {
    pub disease: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResponse {
    pub success: bool,
    pub predicted_class: String,
    pub disease: String,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub description: String,
    pub severity: Severity,
    pub treatment: Treatment,
    pub prevention: Vec<String>,
    pub cultural_practices: Vec<String>,
    pub top_3_predictions: Vec<RankedPrediction>,
    pub model_version: String,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub classes_loaded: usize,
    pub backend: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassesResponse {
    pub total_classes: usize,
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub status: String,
    pub version: String,
    pub classes: usize,
    pub model_accuracy: String,
    pub endpoint: String,
}
