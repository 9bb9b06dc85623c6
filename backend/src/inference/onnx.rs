use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Value;

use super::model::{Classifier, InferenceError};
use super::preprocess::InputTensor;

fn load_error(path: &Path, e: impl std::fmt::Display) -> InferenceError {
    InferenceError::Load {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// ONNX Runtime classifier for channels-last exports whose last layer is already a softmax.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
}

impl OnnxClassifier {
    pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
        let session = Session::builder()
            .map_err(|e| load_error(model_path, e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_error(model_path, e))?
            .with_intra_threads(4)
            .map_err(|e| load_error(model_path, e))?
            .commit_from_file(model_path)
            .map_err(|e| load_error(model_path, e))?;

        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| load_error(model_path, "model declares no inputs"))?;

        log::info!("Loaded ONNX model with input '{}'", input_name);
        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn infer(&self, tensor: &InputTensor) -> Result<Vec<f32>, InferenceError> {
        let input_tensor = Value::from_array(tensor.clone())
            .map_err(|e| InferenceError::Model(format!("Failed to create tensor value: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::Model("session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input_tensor])
            .map_err(|e| InferenceError::Model(format!("Inference failed: {}", e)))?;

        let output_value = outputs
            .values()
            .next()
            .ok_or_else(|| InferenceError::Model("Model produced no outputs".to_string()))?;

        let (_, data) = output_value
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Model(format!("Failed to extract output tensor: {}", e)))?;

        Ok(data.to_vec())
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}
