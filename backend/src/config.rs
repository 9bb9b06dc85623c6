use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}

/// Which classifier runtime loads the model artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelBackend {
    Torch,
    Onnx,
}

impl ModelBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "torch" | "torchscript" => Some(Self::Torch),
            "onnx" => Some(Self::Onnx),
            _ => None,
        }
    }
}

/// Process settings, read from the environment after `.env` is loaded.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub model_path: PathBuf,
    pub class_names_path: PathBuf,
    pub model_backend: ModelBackend,
    pub disease_db_path: Option<PathBuf>,
    pub pipeline_config_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidVar { name: "PORT", value })?,
            Err(_) => 8001,
        };

        let model_backend = match env::var("MODEL_BACKEND") {
            Ok(value) => ModelBackend::parse(&value)
                .ok_or(ConfigError::InvalidVar { name: "MODEL_BACKEND", value })?,
            Err(_) => ModelBackend::Onnx,
        };

        Ok(Self {
            port,
            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "models/best_model.onnx".to_string())
                .into(),
            class_names_path: env::var("CLASS_NAMES_PATH")
                .unwrap_or_else(|_| "models/class_names.json".to_string())
                .into(),
            model_backend,
            disease_db_path: env::var("DISEASE_DB_PATH").ok().map(PathBuf::from),
            pipeline_config_path: env::var("PIPELINE_CONFIG_PATH").ok().map(PathBuf::from),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

/// Tunables of the diagnosis pipeline. Every field has a default so a partial YAML file works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input_size: [u32; 2],
    pub model_version: String,
    /// Held-out accuracy of the deployed model, reported verbatim by `GET /`.
    pub model_accuracy: String,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub min_side: u32,
    pub max_aspect_ratio: f64,
    pub probe_size: u32,
    pub min_green_ratio: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_size: [224, 224],
            model_version: "1.0".to_string(),
            model_accuracy: "88-90%".to_string(),
            validation: ValidationConfig::default(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_side: 50,
            max_aspect_ratio: 10.0,
            probe_size: 100,
            min_green_ratio: 0.05,
        }
    }
}

impl PipelineConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&config_str)
    }
}
