//! Directory snapshot source: lists base names by extension for one poll.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Extension of in-progress acquisition files.
pub const PENDING_EXT: &str = "tmp";
/// Extension of finalized slide images.
pub const FINAL_EXT: &str = "svs";

/// Pure directory-listing query, called twice per tick by the monitor loop.
///
/// Failures (directory unreadable, locked) are per-tick recoverable; the
/// caller reports them and retries on the next interval.
pub trait SnapshotSource {
    fn base_names(&self, extension: &str) -> Result<BTreeSet<String>>;
}

/// The scanner's output directory.
pub struct WatchDirectory {
    root: PathBuf,
}

impl WatchDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SnapshotSource for WatchDirectory {
    fn base_names(&self, extension: &str) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();

        // Top level only; the scanner writes flat into its output directory.
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry
                .with_context(|| format!("failed to read {}", self.root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(extension) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.insert(stem.to_string());
            }
        }

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn lists_base_names_for_matching_extension_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("slide_1.tmp"), b"").unwrap();
        fs::write(dir.path().join("slide_2.tmp"), b"").unwrap();
        fs::write(dir.path().join("slide_1.svs"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let source = WatchDirectory::new(dir.path());

        assert_eq!(
            source.base_names(PENDING_EXT).unwrap(),
            names(&["slide_1", "slide_2"])
        );
        assert_eq!(source.base_names(FINAL_EXT).unwrap(), names(&["slide_1"]));
    }

    #[test]
    fn ignores_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("archive.tmp")).unwrap();
        fs::write(dir.path().join("slide.tmp"), b"").unwrap();

        let source = WatchDirectory::new(dir.path());
        assert_eq!(source.base_names(PENDING_EXT).unwrap(), names(&["slide"]));
    }

    #[test]
    fn empty_directory_yields_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let source = WatchDirectory::new(dir.path());
        assert!(source.base_names(PENDING_EXT).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let source = WatchDirectory::new("/nonexistent/wsimon-test-dir");
        assert!(source.base_names(PENDING_EXT).is_err());
    }
}
