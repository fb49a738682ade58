//! Filesystem helpers for writing artifacts.

use crate::core::errors::{ClassifierError, ClassifierResult};
use std::path::Path;

/// Creates the directory `path` will be written into, if it has one.
pub fn ensure_parent_dir(path: &Path) -> ClassifierResult<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => std::fs::create_dir_all(parent).map_err(|e| ClassifierError::io(parent, e)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_nested_parent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b").join("model.safetensors");
        ensure_parent_dir(&target).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
        assert!(!target.exists());
    }

    #[test]
    fn test_bare_file_name_is_fine() {
        ensure_parent_dir(Path::new("model.safetensors")).unwrap();
    }

    #[test]
    fn test_parent_blocked_by_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let err = ensure_parent_dir(&blocker.join("class_names.json")).unwrap_err();
        assert!(matches!(err, ClassifierError::Io { .. }));
    }
}
