//! Labeled image dataset discovered from a directory tree.
//!
//! Each top-level subdirectory of the training directory is one class.
//! Classes are indexed in byte order of their names so the assignment does
//! not depend on the platform or locale.

use crate::core::constants::DATASET_IMAGE_EXTENSIONS;
use crate::core::errors::{ClassifierError, ClassifierResult};
use crate::domain::ClassMap;
use crate::utils::has_extension_in;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// One image file and the class it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub path: PathBuf,
    pub class_index: usize,
}

/// Training and validation subsets produced by [`ImageDataset::split`].
#[derive(Debug, Clone, Default)]
pub struct DatasetSplit {
    pub training: Vec<Sample>,
    pub validation: Vec<Sample>,
}

/// All samples found under a training directory, grouped by class.
#[derive(Debug, Clone)]
pub struct ImageDataset {
    root: PathBuf,
    class_names: Vec<String>,
    /// Files per class, indexed like `class_names`.
    files: Vec<Vec<PathBuf>>,
}

impl ImageDataset {
    /// Scans `root` for class directories and their image files.
    ///
    /// # Errors
    ///
    /// Returns `DatasetNotFound` if `root` is not a directory and `Io` if
    /// any part of the tree cannot be listed.
    pub fn scan(root: &Path) -> ClassifierResult<Self> {
        if !root.is_dir() {
            return Err(ClassifierError::DatasetNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut classes: Vec<(String, PathBuf)> = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| walk_error(root, e))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) => classes.push((name.to_string(), path.to_path_buf())),
                None => debug!("Skipping class directory with non UTF-8 name: {}", path.display()),
            }
        }
        classes.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

        let mut class_names = Vec::with_capacity(classes.len());
        let mut files = Vec::with_capacity(classes.len());
        for (name, dir) in classes {
            let class_files = collect_images(&dir)?;
            debug!("Class '{}': {} images", name, class_files.len());
            class_names.push(name);
            files.push(class_files);
        }

        Ok(Self {
            root: root.to_path_buf(),
            class_names,
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Class names in index order.
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn num_classes(&self) -> usize {
        self.class_names.len()
    }

    /// Total number of image files across all classes.
    pub fn len(&self) -> usize {
        self.files.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The index-to-label mapping implied by the class directories.
    pub fn class_map(&self) -> ClassMap {
        ClassMap::from_labels(self.class_names.iter().cloned())
    }

    /// All samples, class by class.
    pub fn samples(&self) -> Vec<Sample> {
        self.files
            .iter()
            .enumerate()
            .flat_map(|(class_index, paths)| {
                paths.iter().map(move |path| Sample {
                    path: path.clone(),
                    class_index,
                })
            })
            .collect()
    }

    /// Holds out the first `floor(fraction * n)` files of every class for
    /// validation and keeps the rest for training.
    pub fn split(&self, validation_fraction: f32) -> DatasetSplit {
        let mut split = DatasetSplit::default();
        for (class_index, paths) in self.files.iter().enumerate() {
            let held_out = (validation_fraction as f64 * paths.len() as f64).floor() as usize;
            let held_out = held_out.min(paths.len());
            for (i, path) in paths.iter().enumerate() {
                let sample = Sample {
                    path: path.clone(),
                    class_index,
                };
                if i < held_out {
                    split.validation.push(sample);
                } else {
                    split.training.push(sample);
                }
            }
        }
        split
    }
}

/// Image files below `dir`, ordered by (parent directory, file name).
///
/// Symlinked directories are not descended into; symlinked files are kept.
fn collect_images(dir: &Path) -> ClassifierResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false).min_depth(1) {
        let entry = entry.map_err(|e| walk_error(dir, e))?;
        if entry.file_type().is_dir() || !entry.path().is_file() {
            continue;
        }
        if has_extension_in(entry.path(), DATASET_IMAGE_EXTENSIONS) {
            found.push(entry.into_path());
        }
    }
    found.sort_by(|a, b| {
        let parent_a = a.parent().map(Path::as_os_str);
        let parent_b = b.parent().map(Path::as_os_str);
        parent_a
            .cmp(&parent_b)
            .then_with(|| a.file_name().cmp(&b.file_name()))
    });
    Ok(found)
}

fn walk_error(root: &Path, err: walkdir::Error) -> ClassifierError {
    let path = err.path().unwrap_or(root).to_path_buf();
    ClassifierError::io(&path, std::io::Error::from(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"not decoded during scan").unwrap();
    }

    #[test]
    fn test_scan_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageDataset::scan(&dir.path().join("train")).unwrap_err();
        assert!(matches!(err, ClassifierError::DatasetNotFound { .. }));
    }

    #[test]
    fn test_classes_are_indexed_in_byte_order() {
        let dir = tempfile::tempdir().unwrap();
        // created out of order on purpose; uppercase sorts before lowercase
        for name in ["pug", "Beagle", "akita", "corgi"] {
            touch(&dir.path().join(name).join("a.jpg"));
        }
        touch(&dir.path().join("README.txt"));

        let dataset = ImageDataset::scan(dir.path()).unwrap();
        assert_eq!(dataset.class_names(), &["Beagle", "akita", "corgi", "pug"]);

        let map = dataset.class_map();
        assert_eq!(map.len(), 4);
        for (i, name) in dataset.class_names().iter().enumerate() {
            assert_eq!(map.get(i), Some(name.as_str()));
        }
    }

    #[test]
    fn test_empty_class_directory_still_counts() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("beagle").join("1.png"));
        std::fs::create_dir_all(dir.path().join("husky")).unwrap();

        let dataset = ImageDataset::scan(dir.path()).unwrap();
        assert_eq!(dataset.num_classes(), 2);
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_files_are_filtered_and_found_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let class = dir.path().join("beagle");
        touch(&class.join("b.JPG"));
        touch(&class.join("a.png"));
        touch(&class.join("notes.txt"));
        touch(&class.join("nested").join("c.jpeg"));

        let dataset = ImageDataset::scan(dir.path()).unwrap();
        let names: Vec<String> = dataset
            .samples()
            .iter()
            .map(|s| s.path.strip_prefix(&class).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["a.png", "b.JPG", "nested/c.jpeg"]);
    }

    #[test]
    fn test_split_holds_out_leading_files_per_class() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..10 {
            touch(&dir.path().join("beagle").join(format!("{i:02}.png")));
        }
        for i in 0..4 {
            touch(&dir.path().join("pug").join(format!("{i:02}.png")));
        }

        let dataset = ImageDataset::scan(dir.path()).unwrap();
        let split = dataset.split(0.2);
        // floor(0.2 * 10) = 2 beagles, floor(0.2 * 4) = 0 pugs
        assert_eq!(split.validation.len(), 2);
        assert_eq!(split.training.len(), 12);
        assert!(split.validation.iter().all(|s| s.class_index == 0));
        assert!(split.validation[0].path.ends_with("00.png"));
        assert!(split.validation[1].path.ends_with("01.png"));
        assert!(split.training[0].path.ends_with("02.png"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directories_are_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        let class = dir.path().join("beagle");
        touch(&class.join("a.png"));
        std::os::unix::fs::symlink(&class, class.join("loop")).unwrap();

        let dataset = ImageDataset::scan(dir.path()).unwrap();
        assert_eq!(dataset.num_classes(), 1);
        assert_eq!(dataset.len(), 1);
        assert!(dataset.samples()[0].path.ends_with("beagle/a.png"));
    }
}
