use image::DynamicImage;
use image::imageops::FilterType;
use ndarray::Array4;

use super::model::InferenceError;

/// Model input in NHWC layout: `[1, height, width, 3]`, values in `[0, 1]`.
pub type InputTensor = Array4<f32>;

pub const CHANNELS: usize = 3;

#[derive(Debug, Clone)]
pub struct Preprocessor {
    width: u32,
    height: u32,
}

impl Preprocessor {
    pub fn new(input_size: [u32; 2]) -> Self {
        let [width, height] = input_size;
        Self { width, height }
    }

    pub fn target_shape(&self) -> [usize; 4] {
        [1, self.height as usize, self.width as usize, CHANNELS]
    }

    pub fn preprocess(&self, image: &DynamicImage) -> Result<InputTensor, InferenceError> {
        let resized = image.resize_exact(self.width, self.height, FilterType::CatmullRom);

        // to_rgb8 replicates luma into three channels and drops alpha.
        let rgb = resized.to_rgb8();
        let data: Vec<f32> = rgb.into_raw().into_iter().map(|v| v as f32 / 255.0).collect();

        let [n, h, w, c] = self.target_shape();
        Ok(Array4::from_shape_vec((n, h, w, c), data)?)
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new([224, 224])
    }
}
