use std::path::Path;
use std::sync::Mutex;

use tch::nn::ModuleT;
use tch::{CModule, Device, Kind, Tensor};

use super::model::{Classifier, InferenceError, softmax};
use super::preprocess::InputTensor;

/// TorchScript classifier. The module expects NCHW input and emits logits.
pub struct TorchClassifier {
    model: Mutex<CModule>,
    device: Device,
}

impl TorchClassifier {
    pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
        let device = Device::cuda_if_available();
        let mut model =
            CModule::load_on_device(model_path, device).map_err(|e| InferenceError::Load {
                path: model_path.display().to_string(),
                message: e.to_string(),
            })?;
        model.set_eval();
        log::info!("Loaded TorchScript model on {:?}", device);
        Ok(Self {
            model: Mutex::new(model),
            device,
        })
    }
}

impl Classifier for TorchClassifier {
    fn infer(&self, tensor: &InputTensor) -> Result<Vec<f32>, InferenceError> {
        let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();
        let data: Vec<f32> = tensor.iter().copied().collect();

        let input = Tensor::from_slice(&data)
            .view(shape.as_slice())
            .permute([0i64, 3, 1, 2])
            .to_device(self.device);

        let model = self
            .model
            .lock()
            .map_err(|_| InferenceError::Model("model lock poisoned".to_string()))?;
        let output = tch::no_grad(|| model.forward_t(&input, false));

        let output_flat = output.to_kind(Kind::Float).to_device(Device::Cpu).view([-1]);
        let num_elements = output_flat.size()[0] as usize;
        let mut logits = vec![0.0f32; num_elements];
        output_flat.copy_data(&mut logits, num_elements);

        Ok(softmax(&logits))
    }

    fn name(&self) -> &'static str {
        "torch"
    }
}
