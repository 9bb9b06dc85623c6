pub mod labels;
pub mod model;
pub mod preprocess;
pub mod ranking;
pub mod validation;

#[cfg(feature = "onnx")]
pub mod onnx;
#[cfg(feature = "torch")]
pub mod torch;
