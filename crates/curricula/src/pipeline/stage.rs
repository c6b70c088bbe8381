use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::DocumentFormat;
use crate::storage::document_stem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Extraction,
    Standardization,
    Analysis,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Extraction, Stage::Standardization, Stage::Analysis];

    /// Directory name under `log/` for this stage's journal.
    pub fn log_name(&self) -> &'static str {
        match self {
            Stage::Extraction => "extract",
            Stage::Standardization => "process",
            Stage::Analysis => "analyze",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Extraction => "Extraction",
            Stage::Standardization => "Standardization",
            Stage::Analysis => "Analysis",
        }
    }

    fn index(&self) -> usize {
        match self {
            Stage::Extraction => 0,
            Stage::Standardization => 1,
            Stage::Analysis => 2,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageState {
    #[default]
    Pending,
    InProgress,
    Done,
    Skipped,
    Failed,
}

impl StageState {
    /// Done or skipped: the stage's artifact exists.
    pub fn has_artifact(&self) -> bool {
        matches!(self, StageState::Done | StageState::Skipped)
    }
}

/// One résumé as tracked by the orchestrator. Only the orchestrator moves
/// its stage states.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub source_path: PathBuf,
    pub format: DocumentFormat,
    states: [StageState; 3],
}

impl Document {
    pub fn new<P: AsRef<Path>>(source_path: P) -> Self {
        let source_path = source_path.as_ref().to_path_buf();
        Self {
            id: document_stem(&source_path),
            format: DocumentFormat::from_path(&source_path),
            source_path,
            states: [StageState::Pending; 3],
        }
    }

    pub fn state(&self, stage: Stage) -> StageState {
        self.states[stage.index()]
    }

    pub(super) fn set_state(&mut self, stage: Stage, state: StageState) {
        self.states[stage.index()] = state;
    }

    pub fn is_extracted(&self) -> bool {
        self.state(Stage::Extraction).has_artifact()
    }

    pub fn is_standardized(&self) -> bool {
        self.state(Stage::Standardization).has_artifact()
    }

    pub fn is_analyzed(&self) -> bool {
        self.state(Stage::Analysis).has_artifact()
    }
}

/// Why a single document failed a stage. Data, not an error: the batch goes on.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentFailure {
    Decode(String),
    EmptyOutput { reason: String },
    Generation(String),
    Storage(String),
    Report(String),
}

impl fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFailure::Decode(msg) => write!(f, "decode failed: {}", msg),
            DocumentFailure::EmptyOutput { reason } => f.write_str(reason),
            DocumentFailure::Generation(msg) => write!(f, "model call failed: {}", msg),
            DocumentFailure::Storage(msg) => write!(f, "storage failed: {}", msg),
            DocumentFailure::Report(msg) => write!(f, "report append failed: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    Done { artifact: PathBuf },
    Skipped { artifact: PathBuf },
    Failed(DocumentFailure),
}

impl StageOutcome {
    pub fn artifact(&self) -> Option<&Path> {
        match self {
            StageOutcome::Done { artifact } | StageOutcome::Skipped { artifact } => Some(artifact),
            StageOutcome::Failed(_) => None,
        }
    }

    pub fn state(&self) -> StageState {
        match self {
            StageOutcome::Done { .. } => StageState::Done,
            StageOutcome::Skipped { .. } => StageState::Skipped,
            StageOutcome::Failed(_) => StageState::Failed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentResult {
    /// File name of the stage input.
    pub file: String,
    pub document_id: String,
    pub outcome: StageOutcome,
}

/// Per-document outcomes of one stage pass, in processing order.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: Stage,
    pub results: Vec<DocumentResult>,
}

impl StageReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            results: Vec::new(),
        }
    }

    /// Artifacts available after the pass, including skipped ones.
    pub fn produced(&self) -> Vec<PathBuf> {
        self.results
            .iter()
            .filter_map(|r| r.outcome.artifact().map(Path::to_path_buf))
            .collect()
    }

    pub fn done_count(&self) -> usize {
        self.count(StageState::Done)
    }

    pub fn skipped_count(&self) -> usize {
        self.count(StageState::Skipped)
    }

    pub fn failed_count(&self) -> usize {
        self.count(StageState::Failed)
    }

    pub fn produced_nothing(&self) -> bool {
        !self.results.iter().any(|r| r.outcome.artifact().is_some())
    }

    fn count(&self, state: StageState) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome.state() == state)
            .count()
    }
}
