use image::DynamicImage;
use image::imageops::FilterType;

use crate::config::ValidationConfig;

/// Why an upload was turned away before classification.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("Image too small. Please upload a clearer image.")]
    TooSmall { width: u32, height: u32 },
    #[error("Image aspect ratio unusual. Please crop to show only the leaf.")]
    UnusualAspectRatio { ratio: f64 },
    #[error("Image doesn't appear to be a plant leaf. Please upload a tomato leaf image.")]
    NotPlantLike { green_ratio: f64 },
}

/// Cheap triage run before any model compute. It only knows size, shape and
/// greenness, so it errs on the side of accepting: diseased leaves are often
/// yellow or brown and must still reach the classifier.
#[derive(Debug, Clone)]
pub struct ImageValidator {
    config: ValidationConfig,
}

impl ImageValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, image: &DynamicImage) -> Result<(), Rejection> {
        let (width, height) = (image.width(), image.height());
        let short = width.min(height);
        let long = width.max(height);

        if short < self.config.min_side {
            return Err(Rejection::TooSmall { width, height });
        }

        let ratio = long as f64 / short as f64;
        if ratio > self.config.max_aspect_ratio {
            return Err(Rejection::UnusualAspectRatio { ratio });
        }

        // Greenness cannot be judged without colour channels.
        if image.color().channel_count() < 3 {
            return Ok(());
        }

        let green_ratio = self.green_ratio(image);
        if green_ratio < self.config.min_green_ratio {
            return Err(Rejection::NotPlantLike { green_ratio });
        }

        Ok(())
    }

    /// Fraction of pixels, on a downscaled probe, whose green channel beats both red and blue.
    pub fn green_ratio(&self, image: &DynamicImage) -> f64 {
        let probe = image
            .resize_exact(self.config.probe_size, self.config.probe_size, FilterType::Triangle)
            .to_rgb8();

        let total = probe.width() as usize * probe.height() as usize;
        if total == 0 {
            return 0.0;
        }

        let green = probe
            .pixels()
            .filter(|p| p[1] > p[0] && p[1] > p[2])
            .count();

        green as f64 / total as f64
    }
}

impl Default for ImageValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
