use std::path::PathBuf;

use thiserror::Error;

use super::stage::Stage;

/// Run-level failures. Per-document problems never show up here; they are
/// recorded as [`super::stage::DocumentFailure`] on the stage report.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("{} stage produced no artifacts", stage.label())]
    StageProducedNothing { stage: Stage },

    #[error("Storage failed: {0}")]
    Storage(#[from] crate::error::StorageError),

    #[error("Report failed: {0}")]
    Report(#[from] crate::error::ReportError),
}
