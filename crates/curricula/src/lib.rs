pub mod ai;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod sanitize;
pub mod storage;

pub use ai::{Analyzer, GenerativeModel, MessagesClient, Standardizer};
pub use config::{load_job_requirements, JobRequirements, ModelSettings, Workspace};
pub use error::{
    ConfigError, CurriculaError, GenerationError, ProcessError, ReportError, Result, StorageError,
};
pub use pipeline::{Pipeline, PipelineError, ProgressEvent, ProgressReporter, Stage};
pub use processor::{ExtractionStage, TesseractOcr};
