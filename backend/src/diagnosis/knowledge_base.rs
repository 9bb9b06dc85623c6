use serde::{Deserialize, Serialize};
use shared::{Severity, Treatment};
use std::collections::HashMap;
use std::path::Path;

use crate::inference::labels::ClassLabels;

const BUILTIN_TABLE: &str = include_str!("../../config/diseases.yaml");

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeBaseError {
    #[error("Failed to read disease table {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse disease table: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRecord {
    pub disease_name: String,
    pub description: String,
    pub severity: Severity,
    pub treatment: Treatment,
    pub prevention: Vec<String>,
    pub cultural_practices: Vec<String>,
}

lazy_static::lazy_static! {
    /// Guidance served for labels the table does not know. `disease_name` is
    /// left empty; the caller's label stands in for it.
    pub static ref FALLBACK_RECORD: DiseaseRecord = DiseaseRecord {
        disease_name: String::new(),
        description: "Disease information not available".to_string(),
        severity: Severity::Unknown,
        treatment: Treatment {
            chemical: "Consult agricultural expert".to_string(),
            organic: "Maintain plant hygiene".to_string(),
            frequency: "As needed".to_string(),
        },
        prevention: vec!["Regular monitoring".to_string()],
        cultural_practices: vec!["Good sanitation".to_string()],
    };
}

/// Result of a table lookup: a curated entry or the shared fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Found(&'a DiseaseRecord),
    Fallback { label: &'a str },
}

impl<'a> Lookup<'a> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Lookup::Fallback { .. })
    }

    pub fn record(&self) -> &'a DiseaseRecord {
        match *self {
            Lookup::Found(record) => record,
            Lookup::Fallback { .. } => &*FALLBACK_RECORD,
        }
    }

    pub fn disease_name(&self) -> &'a str {
        match *self {
            Lookup::Found(record) => &record.disease_name,
            Lookup::Fallback { label } => label,
        }
    }

    pub fn into_record(self) -> DiseaseRecord {
        DiseaseRecord {
            disease_name: self.disease_name().to_string(),
            ..self.record().clone()
        }
    }
}

/// Static agronomic guidance keyed by class label. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct DiseaseKnowledgeBase {
    records: HashMap<String, DiseaseRecord>,
}

impl DiseaseKnowledgeBase {
    pub fn new(records: HashMap<String, DiseaseRecord>) -> Self {
        Self { records }
    }

    pub fn builtin() -> Result<Self, KnowledgeBaseError> {
        Self::from_yaml(BUILTIN_TABLE)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, KnowledgeBaseError> {
        let records: HashMap<String, DiseaseRecord> = serde_yaml::from_str(yaml)?;
        Ok(Self::new(records))
    }

    pub fn load(path: Option<&Path>) -> Result<Self, KnowledgeBaseError> {
        let Some(path) = path else {
            return Self::builtin();
        };
        let yaml = std::fs::read_to_string(path).map_err(|source| KnowledgeBaseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    pub fn lookup<'a>(&'a self, label: &'a str) -> Lookup<'a> {
        match self.records.get(label) {
            Some(record) => Lookup::Found(record),
            None => Lookup::Fallback { label },
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Labels the classifier can emit that have no curated entry.
    pub fn missing_labels<'a>(&self, labels: &'a ClassLabels) -> Vec<&'a str> {
        labels
            .iter()
            .filter(|label| !self.records.contains_key(*label))
            .collect()
    }
}
