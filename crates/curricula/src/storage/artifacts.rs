use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::Workspace;
use crate::config::workspace::ensure_directory;
use crate::error::StorageError;
use crate::pipeline::Stage;

const STANDARDIZED_SUFFIX: &str = "_standardized.txt";
const ANALYSIS_SUFFIX: &str = "_analysis.txt";

/// Document identity derived from any of its stage files:
/// `cv.pdf`, `cv.txt` and `cv_standardized.txt` all map to `cv`.
pub fn document_stem(path: &Path) -> String {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if let Some(stem) = file_name.strip_suffix(STANDARDIZED_SUFFIX) {
        if !stem.is_empty() {
            return stem.to_string();
        }
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string()
}

/// Stage outputs on disk. An artifact's existence is the idempotency marker
/// for its stage.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    extracted_dir: PathBuf,
    processed_dir: PathBuf,
    analysis_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(workspace: &Workspace) -> Self {
        Self {
            extracted_dir: workspace.extracted_dir(),
            processed_dir: workspace.processed_dir(),
            analysis_dir: workspace.analysis_dir(),
        }
    }

    pub fn artifact_path(&self, stage: Stage, stem: &str) -> PathBuf {
        match stage {
            Stage::Extraction => self.extracted_dir.join(format!("{}.txt", stem)),
            Stage::Standardization => self
                .processed_dir
                .join(format!("{}{}", stem, STANDARDIZED_SUFFIX)),
            Stage::Analysis => self.analysis_dir.join(format!("{}{}", stem, ANALYSIS_SUFFIX)),
        }
    }

    pub fn exists(&self, stage: Stage, stem: &str) -> bool {
        self.artifact_path(stage, stem).is_file()
    }

    /// Writes the artifact through a temporary sibling and a rename, so
    /// readers never see a half-written file and `--force` overwrites cleanly.
    pub fn write(&self, stage: Stage, stem: &str, content: &str) -> Result<PathBuf, StorageError> {
        let path = self.artifact_path(stage, stem);
        let dir = path.parent().unwrap_or(Path::new("."));
        ensure_directory(dir)?;

        let temp_path = dir.join(format!(".{}.{}.tmp", stem, uuid::Uuid::new_v4()));
        let write_result = std::fs::File::create(&temp_path).and_then(|mut file| {
            file.write_all(content.as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = write_result {
            let _ = std::fs::remove_file(&temp_path);
            return Err(StorageError::WriteFile {
                path: path.clone(),
                source: e,
            });
        }

        std::fs::rename(&temp_path, &path).map_err(|e| {
            let _ = std::fs::remove_file(&temp_path);
            StorageError::WriteFile {
                path: path.clone(),
                source: e,
            }
        })?;

        Ok(path)
    }

    /// Reads a stage input. Invalid UTF-8 is replaced rather than rejected.
    pub fn read(&self, path: &Path) -> Result<String, StorageError> {
        let bytes = std::fs::read(path).map_err(|e| StorageError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
