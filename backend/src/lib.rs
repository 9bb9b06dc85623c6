pub mod config;
pub mod diagnosis;
pub mod inference;
pub mod routes;

pub use diagnosis::service::{DiagnosisError, DiagnosisService};
pub use inference::model::{Classifier, InferenceError};
