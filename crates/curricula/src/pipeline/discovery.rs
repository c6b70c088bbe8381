use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::DocumentFormat;

use super::stage::Stage;

/// Finds the inputs of one stage in its source directory (top level only),
/// sorted by file name.
pub struct DirectoryScanner {
    directory: PathBuf,
    stage: Stage,
}

impl DirectoryScanner {
    pub fn new<P: AsRef<Path>>(directory: P, stage: Stage) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            stage,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn scan(&self) -> Vec<PathBuf> {
        if !self.directory.is_dir() {
            warn!(
                "{} input directory {} does not exist",
                self.stage,
                self.directory.display()
            );
            return Vec::new();
        }

        let mut found: Vec<PathBuf> = WalkDir::new(&self.directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| self.accepts(path))
            .collect();
        found.sort();

        for path in &found {
            debug!("Found {} input: {}", self.stage, path.display());
        }
        info!(
            "Scanned {} {} inputs in {}",
            found.len(),
            self.stage,
            self.directory.display()
        );
        found
    }

    fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if name.starts_with('.') {
            return false;
        }

        match self.stage {
            Stage::Extraction => DocumentFormat::from_path(path).is_supported(),
            Stage::Standardization => has_extension(path, "txt"),
            Stage::Analysis => name.ends_with("standardized.txt"),
        }
    }
}

fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}
