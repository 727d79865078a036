//! Locating and collecting built packages
//!
//! Finds build outputs with glob patterns and copies packages into the
//! requested output directory.

use crate::error::{FirError, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Finds build outputs and gathers them in one place
#[derive(Debug, Default, Clone, Copy)]
pub struct ArtifactCollector;

/// A package copied into the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedArtifact {
    /// Where the build left it
    pub source: PathBuf,
    /// Where it was copied to
    pub destination: PathBuf,
}

impl ArtifactCollector {
    pub const fn new() -> Self {
        Self
    }

    /// Entries directly under `dir` ending in `.{extension}`, sorted
    pub fn find(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        self.find_glob_pattern(dir, &format!("*.{extension}"))
    }

    /// Entries anywhere below `dir` ending in `.{extension}`, sorted
    pub fn find_recursive(&self, dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        self.find_glob_pattern(dir, &format!("**/*.{extension}"))
    }

    fn find_glob_pattern(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let full_pattern = format!(
            "{}/{}",
            glob::Pattern::escape(&dir.to_string_lossy()),
            pattern
        );
        debug!("Searching for build outputs: {}", full_pattern);

        let paths = glob::glob(&full_pattern)
            .map_err(|e| FirError::build(format!("Invalid search pattern {full_pattern}: {e}")))?;

        let mut files = Vec::new();
        for path_result in paths {
            match path_result {
                Ok(path) => files.push(path),
                Err(e) => warn!("Error reading path for pattern {}: {}", full_pattern, e),
            }
        }

        files.sort();
        Ok(files)
    }

    /// Copy `packages` into `output_dir`, keeping their file names
    #[instrument(skip(self, packages))]
    pub fn collect(&self, packages: &[PathBuf], output_dir: &Path) -> Result<Vec<CollectedArtifact>> {
        fs::create_dir_all(output_dir)
            .map_err(|e| FirError::file_system("create directory", output_dir, e))?;

        let mut collected = Vec::new();
        for source in packages {
            let file_name = source.file_name().ok_or_else(|| {
                FirError::build(format!("Invalid package path: {}", source.display()))
            })?;
            let destination = output_dir.join(file_name);

            if source != &destination {
                fs::copy(source, &destination)
                    .map_err(|e| FirError::file_system("copy", source, e))?;
            }
            info!("  Copied: {} -> {}", source.display(), destination.display());

            collected.push(CollectedArtifact {
                source: source.clone(),
                destination,
            });
        }

        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.apk"), "b").unwrap();
        fs::write(temp_dir.path().join("a.apk"), "a").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "").unwrap();

        let found = ArtifactCollector::new().find(temp_dir.path(), "apk").unwrap();
        assert_eq!(
            found,
            vec![temp_dir.path().join("a.apk"), temp_dir.path().join("b.apk")]
        );
    }

    #[test]
    fn test_find_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("release");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("app-release.apk"), "apk").unwrap();

        let collector = ArtifactCollector::new();
        assert!(collector.find(temp_dir.path(), "apk").unwrap().is_empty());
        assert_eq!(
            collector.find_recursive(temp_dir.path(), "apk").unwrap(),
            vec![nested.join("app-release.apk")]
        );
    }

    #[test]
    fn test_collect_copies_package() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("Demo.apk");
        fs::write(&source, "apk").unwrap();
        let output = temp_dir.path().join("out");

        let collected = ArtifactCollector::new()
            .collect(&[source.clone()], &output)
            .unwrap();

        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].destination, output.join("Demo.apk"));
        assert_eq!(fs::read_to_string(output.join("Demo.apk")).unwrap(), "apk");
        assert!(source.exists());
    }

    #[test]
    fn test_collect_many() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("a.apk");
        let second = temp_dir.path().join("b.apk");
        fs::write(&first, "a").unwrap();
        fs::write(&second, "b").unwrap();
        let output = temp_dir.path().join("out");

        let collected = ArtifactCollector::new()
            .collect(&[first, second], &output)
            .unwrap();

        let names: Vec<PathBuf> = collected.into_iter().map(|a| a.destination).collect();
        assert_eq!(names, vec![output.join("a.apk"), output.join("b.apk")]);
    }
}
