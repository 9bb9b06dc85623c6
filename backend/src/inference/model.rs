use std::path::Path;

use crate::config::ModelBackend;
use crate::inference::preprocess::InputTensor;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Failed to load model from {path}: {message}")]
    Load { path: String, message: String },
    #[error("Failed to build input tensor: {0}")]
    Preprocess(#[from] ndarray::ShapeError),
    #[error("Model error: {0}")]
    Model(String),
    #[error("Model returned {got} probabilities for {expected} classes")]
    OutputMismatch { expected: usize, got: usize },
    #[error("Model backend '{0}' is not compiled into this binary")]
    BackendUnavailable(&'static str),
}

/// A loaded model that maps one preprocessed tensor to one probability per class.
///
/// Implementations must be deterministic for a fixed tensor and safe to call
/// from several request threads at once.
pub trait Classifier: Send + Sync {
    fn infer(&self, tensor: &InputTensor) -> Result<Vec<f32>, InferenceError>;

    fn name(&self) -> &'static str;
}

pub fn load_classifier(
    backend: ModelBackend,
    model_path: &Path,
) -> Result<Box<dyn Classifier>, InferenceError> {
    match backend {
        #[cfg(feature = "torch")]
        ModelBackend::Torch => Ok(Box::new(super::torch::TorchClassifier::load(model_path)?)),
        #[cfg(not(feature = "torch"))]
        ModelBackend::Torch => {
            let _ = model_path;
            Err(InferenceError::BackendUnavailable("torch"))
        }
        #[cfg(feature = "onnx")]
        ModelBackend::Onnx => Ok(Box::new(super::onnx::OnnxClassifier::load(model_path)?)),
        #[cfg(not(feature = "onnx"))]
        ModelBackend::Onnx => {
            let _ = model_path;
            Err(InferenceError::BackendUnavailable("onnx"))
        }
    }
}

/// Numerically stable softmax over raw logits.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max_logit = logits.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let exp_sum: f32 = logits.iter().map(|&x| (x - max_logit).exp()).sum();
    logits
        .iter()
        .map(|&x| (x - max_logit).exp() / exp_sum)
        .collect()
}
