use backend::config::PipelineConfig;
use backend::diagnosis::knowledge_base::DiseaseKnowledgeBase;
use backend::inference::labels::ClassLabels;
use backend::inference::preprocess::InputTensor;
use backend::{Classifier, DiagnosisError, DiagnosisService, InferenceError};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use shared::{RiskLevel, Severity};
use std::sync::{Arc, Mutex};

const CLASS_NAMES: &str = r#"{
  "0": "Bacterial_spot",
  "1": "Early_blight",
  "2": "Late_blight",
  "3": "Leaf_Mold",
  "4": "Septoria_leaf_spot",
  "5": "Target_Spot",
  "6": "Tomato_Yellow_Leaf_Curl_Virus",
  "7": "Tomato_mosaic_virus",
  "8": "Two_spotted_spider_mite",
  "9": "healthy",
  "10": "Powdery_mildew"
}"#;

/// Returns a fixed vector and records the shape of every tensor it sees.
struct StubClassifier {
    probabilities: Vec<f32>,
    seen_shapes: Arc<Mutex<Vec<Vec<usize>>>>,
}

impl StubClassifier {
    fn peaked(index: usize, peak: f32) -> (Self, Arc<Mutex<Vec<Vec<usize>>>>) {
        let n = 11;
        let rest = (1.0 - peak) / (n - 1) as f32;
        let mut probabilities = vec![rest; n];
        probabilities[index] = peak;
        let seen_shapes = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                probabilities,
                seen_shapes: seen_shapes.clone(),
            },
            seen_shapes,
        )
    }
}

impl Classifier for StubClassifier {
    fn infer(&self, tensor: &InputTensor) -> Result<Vec<f32>, InferenceError> {
        self.seen_shapes.lock().unwrap().push(tensor.shape().to_vec());
        Ok(self.probabilities.clone())
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn service_with(classifier: StubClassifier) -> DiagnosisService {
    DiagnosisService::new(
        Box::new(classifier),
        ClassLabels::from_json(CLASS_NAMES).unwrap(),
        DiseaseKnowledgeBase::builtin().unwrap(),
        PipelineConfig::default(),
    )
}

fn leaf_photo() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(640, 480, |x, y| {
        if (x / 40 + y / 40) % 3 == 0 {
            Rgb([120, 90, 50])
        } else {
            Rgb([40, 150 + (x % 50) as u8, 60])
        }
    }))
}

#[test]
fn test_healthy_leaf_has_no_risk() {
    let (classifier, _) = StubClassifier::peaked(9, 0.96);
    let response = service_with(classifier).diagnose(&leaf_photo()).unwrap();

    assert!(response.success);
    assert_eq!(response.predicted_class, "healthy");
    assert_eq!(response.disease, "Healthy Plant");
    assert_eq!(response.severity, Severity::None);
    assert_eq!(response.risk_level, RiskLevel::None);
    assert_eq!(
        response.prevention,
        vec![
            "Maintain good cultural practices",
            "Regular monitoring for early disease detection",
            "Balanced nutrition",
            "Proper watering schedule",
        ]
    );
}

#[test]
fn test_confident_late_blight_is_critical() {
    let (classifier, shapes) = StubClassifier::peaked(2, 0.85);
    let response = service_with(classifier).diagnose(&leaf_photo()).unwrap();

    assert_eq!(response.predicted_class, "Late_blight");
    assert_eq!(response.confidence, 85.0);
    assert_eq!(response.severity, Severity::VeryHigh);
    assert_eq!(response.risk_level, RiskLevel::Critical);
    assert_eq!(response.treatment.frequency, "Every 5-7 days in humid conditions");

    assert_eq!(response.top_3_predictions.len(), 3);
    assert_eq!(response.top_3_predictions[0].disease, "Late_blight");
    assert_eq!(response.top_3_predictions[0].confidence, 85.0);
    // The remaining classes tie, so the lowest indices follow.
    assert_eq!(response.top_3_predictions[1].disease, "Bacterial_spot");
    assert_eq!(response.top_3_predictions[2].disease, "Early_blight");
    assert_eq!(response.top_3_predictions[1].confidence, 1.5);

    assert_eq!(*shapes.lock().unwrap(), vec![vec![1, 224, 224, 3]]);
}

#[test]
fn test_late_blight_at_exactly_eighty_is_high() {
    let (classifier, _) = StubClassifier::peaked(2, 0.8);
    let response = service_with(classifier).diagnose(&leaf_photo()).unwrap();

    assert_eq!(response.predicted_class, "Late_blight");
    assert_eq!(response.confidence, 80.0);
    assert_eq!(response.risk_level, RiskLevel::High);
}

#[test]
fn test_bacterial_spot_at_exactly_seventy_five_is_medium() {
    let (classifier, _) = StubClassifier::peaked(0, 0.75);
    let response = service_with(classifier).diagnose(&leaf_photo()).unwrap();

    assert_eq!(response.predicted_class, "Bacterial_spot");
    assert_eq!(response.severity, Severity::High);
    assert_eq!(response.confidence, 75.0);
    assert_eq!(response.risk_level, RiskLevel::Medium);
}

#[test]
fn test_early_blight_at_exactly_seventy_is_low() {
    let (classifier, _) = StubClassifier::peaked(1, 0.7);
    let response = service_with(classifier).diagnose(&leaf_photo()).unwrap();

    assert_eq!(response.predicted_class, "Early_blight");
    assert_eq!(response.severity, Severity::Medium);
    assert_eq!(response.confidence, 70.0);
    assert_eq!(response.risk_level, RiskLevel::Low);
}

#[test]
fn test_uncertain_late_blight_is_high() {
    let (classifier, _) = StubClassifier::peaked(2, 0.6);
    let response = service_with(classifier).diagnose(&leaf_photo()).unwrap();
    assert_eq!(response.risk_level, RiskLevel::High);
}

#[test]
fn test_unlisted_class_uses_fallback_guidance() {
    let (classifier, _) = StubClassifier::peaked(10, 0.7);
    let response = service_with(classifier).diagnose(&leaf_photo()).unwrap();

    assert_eq!(response.predicted_class, "Powdery_mildew");
    assert_eq!(response.disease, "Powdery_mildew");
    assert_eq!(response.severity, Severity::Unknown);
    assert_eq!(response.risk_level, RiskLevel::Low);
    assert_eq!(response.description, "Disease information not available");
    assert_eq!(response.prevention, vec!["Regular monitoring"]);
}

#[test]
fn test_grayscale_photo_reaches_classifier() {
    let (classifier, shapes) = StubClassifier::peaked(1, 0.9);
    let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(300, 200, Luma([90])));
    let response = service_with(classifier).diagnose(&gray).unwrap();

    assert_eq!(response.predicted_class, "Early_blight");
    assert_eq!(response.risk_level, RiskLevel::Medium);
    assert_eq!(*shapes.lock().unwrap(), vec![vec![1, 224, 224, 3]]);
}

#[test]
fn test_rejected_image_never_reaches_classifier() {
    let (classifier, shapes) = StubClassifier::peaked(2, 0.99);
    let service = service_with(classifier);

    let banner = DynamicImage::ImageRgb8(RgbImage::from_pixel(2000, 100, Rgb([30, 200, 30])));
    let err = service.diagnose(&banner).unwrap_err();
    assert!(matches!(err, DiagnosisError::ValidationRejected(_)));
    assert!(err.to_string().contains("aspect ratio"));

    assert!(shapes.lock().unwrap().is_empty());
}

#[test]
fn test_service_is_shareable_across_threads() {
    let (classifier, shapes) = StubClassifier::peaked(2, 0.85);
    let service = Arc::new(service_with(classifier));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = service.clone();
            std::thread::spawn(move || service.diagnose(&leaf_photo()).unwrap().risk_level)
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), RiskLevel::Critical);
    }
    assert_eq!(shapes.lock().unwrap().len(), 4);
}
