//! Orchestration of the extract → standardize → analyze stages.

pub mod discovery;
pub mod error;
pub mod journal;
pub mod progress;
pub mod runner;
pub mod stage;

pub use discovery::DirectoryScanner;
pub use error::PipelineError;
pub use journal::{JournalLevel, StageJournal};
pub use progress::{
    render_event, ConsoleProgress, FallbackReason, NoopProgress, ProgressEvent, ProgressReporter,
};
pub use runner::{AnalysisRun, Pipeline, PipelineRun};
pub use stage::{
    Document, DocumentFailure, DocumentResult, Stage, StageOutcome, StageReport, StageState,
};
