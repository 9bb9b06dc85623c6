use shared::{DiagnosisResponse, RankedPrediction, RiskLevel};

use super::knowledge_base::Lookup;
use crate::inference::ranking::Ranking;

/// Rounds a percentage to two decimals for reporting.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Builds the response from already computed parts. Nothing is re-derived here.
pub fn assemble(
    ranking: &Ranking,
    lookup: Lookup<'_>,
    risk_level: RiskLevel,
    model_version: &str,
) -> DiagnosisResponse {
    let record = lookup.record();

    let top_3_predictions = ranking
        .top_k
        .iter()
        .map(|candidate| RankedPrediction {
            disease: candidate.label.clone(),
            confidence: round2(candidate.confidence),
        })
        .collect();

    DiagnosisResponse {
        success: true,
        predicted_class: ranking.top1.label.clone(),
        disease: lookup.disease_name().to_string(),
        confidence: round2(ranking.top1.confidence),
        risk_level,
        description: record.description.clone(),
        severity: record.severity,
        treatment: record.treatment.clone(),
        prevention: record.prevention.clone(),
        cultural_practices: record.cultural_practices.clone(),
        top_3_predictions,
        model_version: model_version.to_string(),
        timestamp: None,
    }
}
