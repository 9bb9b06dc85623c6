use shared::{RiskLevel, Severity};

/// Maps a severity tier and a confidence percentage to a risk level.
///
/// Each tier has one cut-off; a confidence equal to the cut-off stays in the lower level.
pub fn score(confidence: f64, severity: Severity) -> RiskLevel {
    match severity {
        Severity::None => RiskLevel::None,
        Severity::VeryHigh if confidence > 80.0 => RiskLevel::Critical,
        Severity::VeryHigh => RiskLevel::High,
        Severity::High if confidence > 75.0 => RiskLevel::High,
        Severity::High => RiskLevel::Medium,
        Severity::Medium if confidence > 70.0 => RiskLevel::Medium,
        Severity::Medium => RiskLevel::Low,
        Severity::Low | Severity::Unknown => RiskLevel::Low,
    }
}
