use std::path::{Path, PathBuf};

use crate::config::schema::DirectoriesConfig;
use crate::error::StorageError;
use crate::pipeline::Stage;

/// Journal subdirectory for diagnostics that belong to no single stage.
pub const SYSTEM_LOG_SCOPE: &str = "system";

/// Directory layout of one run, resolved against the base directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    base: PathBuf,
    dirs: DirectoriesConfig,
}

impl Workspace {
    pub fn new<P: AsRef<Path>>(base: P, dirs: DirectoriesConfig) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
            dirs,
        }
    }

    pub fn with_defaults<P: AsRef<Path>>(base: P) -> Self {
        Self::new(base, DirectoriesConfig::default())
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn input_dir(&self) -> PathBuf {
        self.base.join(&self.dirs.input)
    }

    pub fn extracted_dir(&self) -> PathBuf {
        self.base.join(&self.dirs.extracted)
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.base.join(&self.dirs.processed)
    }

    pub fn analysis_dir(&self) -> PathBuf {
        self.base.join(&self.dirs.analysis)
    }

    pub fn report_dir(&self) -> PathBuf {
        self.base.join(&self.dirs.report)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.base.join(&self.dirs.log)
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.base.join(&self.dirs.temp)
    }

    /// Journal directory for a stage (`log/extract`, `log/process`, ...).
    pub fn stage_log_dir(&self, scope: &str) -> PathBuf {
        self.log_dir().join(scope)
    }

    /// Default job requirements location, `<base>/config/job-requirements.json`.
    pub fn default_requirements_path(&self) -> PathBuf {
        self.base.join("config").join("job-requirements.json")
    }

    /// Creates every directory of the layout. Safe to call repeatedly and
    /// concurrently: existing directories are left alone.
    pub fn ensure_all(&self) -> Result<(), StorageError> {
        let mut dirs = vec![
            self.input_dir(),
            self.extracted_dir(),
            self.processed_dir(),
            self.analysis_dir(),
            self.report_dir(),
            self.log_dir(),
            self.temp_dir(),
        ];
        dirs.extend(
            Stage::ALL
                .iter()
                .map(|stage| self.stage_log_dir(stage.log_name())),
        );
        dirs.push(self.stage_log_dir(SYSTEM_LOG_SCOPE));

        for dir in &dirs {
            ensure_directory(dir)?;
        }
        Ok(())
    }
}

/// create_dir_all already tolerates existing directories; a concurrent creator
/// winning the race is not an error either.
pub fn ensure_directory(path: &Path) -> Result<(), StorageError> {
    match std::fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(StorageError::CreateDirectory {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
