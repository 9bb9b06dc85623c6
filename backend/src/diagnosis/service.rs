use image::DynamicImage;
use shared::DiagnosisResponse;

use super::assembler;
use super::knowledge_base::DiseaseKnowledgeBase;
use super::risk;
use crate::config::PipelineConfig;
use crate::inference::labels::ClassLabels;
use crate::inference::model::{Classifier, InferenceError};
use crate::inference::preprocess::Preprocessor;
use crate::inference::ranking;
use crate::inference::validation::{ImageValidator, Rejection};

#[derive(Debug, thiserror::Error)]
pub enum DiagnosisError {
    #[error("{0}")]
    ValidationRejected(#[from] Rejection),
    #[error("Prediction failed: {0}")]
    InferenceFailure(#[from] InferenceError),
}

impl DiagnosisError {
    /// True when the caller sent an unusable image rather than the service failing.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DiagnosisError::ValidationRejected(_))
    }
}

/// The full image-to-diagnosis pipeline. Built once at startup and shared by
/// every request; nothing in it is mutated afterwards.
pub struct DiagnosisService {
    classifier: Box<dyn Classifier>,
    labels: ClassLabels,
    knowledge_base: DiseaseKnowledgeBase,
    validator: ImageValidator,
    preprocessor: Preprocessor,
    model_version: String,
    model_accuracy: String,
}

impl DiagnosisService {
    pub fn new(
        classifier: Box<dyn Classifier>,
        labels: ClassLabels,
        knowledge_base: DiseaseKnowledgeBase,
        config: PipelineConfig,
    ) -> Self {
        for label in knowledge_base.missing_labels(&labels) {
            log::warn!(
                "No knowledge base entry for class '{}', fallback guidance will be used",
                label
            );
        }

        Self {
            classifier,
            labels,
            knowledge_base,
            validator: ImageValidator::new(config.validation),
            preprocessor: Preprocessor::new(config.input_size),
            model_version: config.model_version,
            model_accuracy: config.model_accuracy,
        }
    }

    pub fn diagnose(&self, image: &DynamicImage) -> Result<DiagnosisResponse, DiagnosisError> {
        self.validator.validate(image)?;

        let tensor = self.preprocessor.preprocess(image)?;
        let probabilities = self.classifier.infer(&tensor)?;
        let ranking = ranking::rank(&probabilities, &self.labels)?;

        let lookup = self.knowledge_base.lookup(&ranking.top1.label);
        if lookup.is_fallback() {
            log::warn!("Class '{}' has no knowledge base entry", ranking.top1.label);
        }

        let risk_level = risk::score(ranking.top1.confidence, lookup.record().severity);
        log::debug!(
            "Top-1 {} ({:.2}%), severity {}, risk {}",
            ranking.top1.label,
            ranking.top1.confidence,
            lookup.record().severity,
            risk_level
        );

        Ok(assembler::assemble(&ranking, lookup, risk_level, &self.model_version))
    }

    pub fn class_count(&self) -> usize {
        self.labels.len()
    }

    pub fn class_labels(&self) -> &[String] {
        self.labels.as_slice()
    }

    pub fn backend_name(&self) -> &'static str {
        self.classifier.name()
    }

    pub fn model_accuracy(&self) -> &str {
        &self.model_accuracy
    }
}
