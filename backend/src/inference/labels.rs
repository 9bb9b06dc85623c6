use std::collections::BTreeMap;
use std::path::Path;

/// The classifier needs at least this many classes to fill a top-3 shortlist.
pub const MIN_CLASSES: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("Failed to read class names file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse class names JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid class index key '{0}'")]
    InvalidIndex(String),
    #[error("Class indices are not contiguous: missing index {0}")]
    MissingIndex(usize),
    #[error("Expected at least 3 classes, found {0}")]
    TooFewClasses(usize),
}

/// Ordered, immutable set of class labels, index-aligned with the classifier output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLabels {
    labels: Vec<String>,
}

impl ClassLabels {
    pub fn new(labels: Vec<String>) -> Result<Self, LabelError> {
        if labels.len() < MIN_CLASSES {
            return Err(LabelError::TooFewClasses(labels.len()));
        }
        Ok(Self { labels })
    }

    /// Parses the `{"0": "Bacterial_spot", "1": ...}` mapping written next to the model.
    pub fn from_json(json: &str) -> Result<Self, LabelError> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;

        let mut indexed = raw
            .into_iter()
            .map(|(key, label)| {
                key.trim()
                    .parse::<usize>()
                    .map(|idx| (idx, label))
                    .map_err(|_| LabelError::InvalidIndex(key))
            })
            .collect::<Result<Vec<_>, _>>()?;
        indexed.sort_by_key(|(idx, _)| *idx);

        for (expected, (idx, _)) in indexed.iter().enumerate() {
            if *idx != expected {
                return Err(LabelError::MissingIndex(expected));
            }
        }

        Self::new(indexed.into_iter().map(|(_, label)| label).collect())
    }

    pub fn load(path: &Path) -> Result<Self, LabelError> {
        let content = std::fs::read_to_string(path).map_err(|source| LabelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
