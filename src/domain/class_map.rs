//! Index-to-label mapping shared between training and inference.
//!
//! On disk the mapping is a JSON object whose keys are decimal strings
//! (`{"0": "beagle", "1": "pug"}`). Loading parses every key into a `usize`
//! up front, so lookups never deal with string keys.

use crate::core::errors::{ClassifierError, ClassifierResult};
use crate::utils::ensure_parent_dir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Mapping from class index to human-readable label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<usize, String>"
)]
pub struct ClassMap {
    labels: BTreeMap<usize, String>,
}

impl ClassMap {
    /// Builds a dense mapping, assigning indices `0..n` in iteration order.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).enumerate().collect(),
        }
    }

    /// Reads a mapping written by [`ClassMap::save`].
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, `Json` if it is not a JSON
    /// object of strings, and `ClassMapFormat` if a key is not a
    /// non-negative integer.
    pub fn load(path: &Path) -> ClassifierResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ClassifierError::io(path, e))?;
        Self::from_json_str(&raw).map_err(|e| match e {
            ClassifierError::Json { source, .. } => ClassifierError::json(path, source),
            other => other,
        })
    }

    /// Parses a mapping from JSON text.
    pub fn from_json_str(raw: &str) -> ClassifierResult<Self> {
        let keyed: BTreeMap<String, String> =
            serde_json::from_str(raw).map_err(|e| ClassifierError::json(Path::new("<memory>"), e))?;
        Self::try_from(keyed)
    }

    /// Writes the mapping as pretty-printed JSON with string keys, creating
    /// the parent directory if needed.
    pub fn save(&self, path: &Path) -> ClassifierResult<()> {
        ensure_parent_dir(path)?;
        let json = serde_json::to_string_pretty(self).map_err(|e| ClassifierError::json(path, e))?;
        std::fs::write(path, json).map_err(|e| ClassifierError::io(path, e))
    }

    /// Label for an index, if present.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(&index).map(String::as_str)
    }

    /// Label for an index, falling back to the index itself.
    pub fn label_or_index(&self, index: usize) -> String {
        self.get(index)
            .map(str::to_string)
            .unwrap_or_else(|| index.to_string())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Entries in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.labels.iter().map(|(&i, label)| (i, label.as_str()))
    }
}

impl TryFrom<BTreeMap<String, String>> for ClassMap {
    type Error = ClassifierError;

    fn try_from(keyed: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut labels = BTreeMap::new();
        for (key, label) in keyed {
            let index = key
                .trim()
                .parse::<usize>()
                .map_err(|_| ClassifierError::ClassMapFormat { key: key.clone() })?;
            labels.insert(index, label);
        }
        Ok(Self { labels })
    }
}

impl From<ClassMap> for BTreeMap<usize, String> {
    fn from(map: ClassMap) -> Self {
        map.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_labels_assigns_dense_indices() {
        let map = ClassMap::from_labels(["beagle", "corgi", "pug"]);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(0), Some("beagle"));
        assert_eq!(map.get(2), Some("pug"));
        assert_eq!(map.get(3), None);
    }

    #[test]
    fn test_keys_are_parsed_as_integers() {
        let map = ClassMap::from_json_str(r#"{"0": "beagle", "10": "pug", "2": "corgi"}"#).unwrap();
        let indices: Vec<usize> = map.iter().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![0, 2, 10]);
        assert_eq!(map.get(10), Some("pug"));
    }

    #[test]
    fn test_non_integer_key_is_rejected() {
        let err = ClassMap::from_json_str(r#"{"zero": "beagle"}"#).unwrap_err();
        assert!(matches!(err, ClassifierError::ClassMapFormat { key } if key == "zero"));

        let err = ClassMap::from_json_str(r#"{"-1": "beagle"}"#).unwrap_err();
        assert!(matches!(err, ClassifierError::ClassMapFormat { .. }));
    }

    #[test]
    fn test_save_then_load_twice_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("class_names.json");
        let labels: Vec<String> = (0..12).map(|i| format!("breed_{i}")).collect();
        let original = ClassMap::from_labels(labels);
        original.save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"11\": \"breed_11\""));

        let first = ClassMap::load(&path).unwrap();
        first.save(&path).unwrap();
        let second = ClassMap::load(&path).unwrap();
        assert_eq!(first, original);
        assert_eq!(second, first);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta").join("class_names.json");
        ClassMap::from_labels(["beagle"]).save(&path).unwrap();
        assert_eq!(ClassMap::load(&path).unwrap().get(0), Some("beagle"));
    }

    #[test]
    fn test_label_falls_back_to_index() {
        let map = ClassMap::from_labels(["beagle"]);
        assert_eq!(map.label_or_index(0), "beagle");
        assert_eq!(map.label_or_index(7), "7");
    }

    #[test]
    fn test_load_reports_path_on_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        match ClassMap::load(&path).unwrap_err() {
            ClassifierError::Json { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
