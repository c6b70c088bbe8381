use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, info_span, warn};

use crate::ai::{Analyzer, GenerativeModel, Standardizer};
use crate::config::{ExtractionSettings, JobRequirements, Workspace};
use crate::processor::{ExtractionStage, OcrEngine};
use crate::sanitize;
use crate::storage::{document_stem, ArtifactStore, ResultSink};

use super::discovery::DirectoryScanner;
use super::error::PipelineError;
use super::journal::StageJournal;
use super::progress::{FallbackReason, ProgressEvent, ProgressReporter};
use super::stage::{
    Document, DocumentFailure, DocumentResult, Stage, StageOutcome, StageReport, StageState,
};

const EMPTY_AFTER_OCR: &str = "Extracted text is empty, even after OCR attempt";
const EMPTY_WITHOUT_OCR: &str = "Extracted text is empty and OCR is unavailable";

/// Outcome of an analysis pass plus the table its rows went to.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub report: StageReport,
    /// Set when at least one row was appended in this pass.
    pub consolidated: Option<PathBuf>,
}

/// Reports of a full extract → standardize → analyze run.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub extraction: StageReport,
    pub standardization: StageReport,
    pub analysis: AnalysisRun,
}

struct Produced {
    artifact: PathBuf,
    degraded: bool,
}

impl Produced {
    fn plain(artifact: PathBuf) -> Self {
        Self {
            artifact,
            degraded: false,
        }
    }
}

/// Sequences the three stages over the workspace.
///
/// Stages are injected once and never see the orchestrator. Per-document
/// failures are recorded on the [`StageReport`] and the batch continues;
/// only run-level problems come back as [`PipelineError`].
pub struct Pipeline {
    workspace: Workspace,
    extraction: ExtractionStage,
    standardizer: Standardizer,
    analyzer: Analyzer,
    artifacts: ArtifactStore,
    sink: ResultSink,
    journal: StageJournal,
    ocr_available: bool,
    documents: BTreeMap<String, Document>,
}

impl Pipeline {
    /// Production constructor: the default decoders plus the given model and
    /// OCR engine.
    pub fn from_settings(
        workspace: Workspace,
        requirements: Arc<JobRequirements>,
        model: Arc<dyn GenerativeModel>,
        ocr: Arc<dyn OcrEngine>,
        settings: ExtractionSettings,
    ) -> Self {
        let extraction = ExtractionStage::new(
            ExtractionStage::default_decoders(settings.max_document_bytes),
            ocr,
            &requirements.output_language,
            settings.max_document_bytes,
        );
        let standardizer = Standardizer::new(model.clone(), requirements.clone());
        let analyzer = Analyzer::new(model, requirements);

        Self::new(workspace, extraction, standardizer, analyzer)
    }

    /// Probes OCR once; the answer holds for the lifetime of the pipeline.
    pub fn new(
        workspace: Workspace,
        extraction: ExtractionStage,
        standardizer: Standardizer,
        analyzer: Analyzer,
    ) -> Self {
        let journal = StageJournal::new(workspace.log_dir());

        let ocr_available = extraction.is_ocr_available();
        if ocr_available {
            info!(language = extraction.language_hint(), "OCR available as fallback");
        } else {
            warn!("OCR unavailable, documents without a text layer will fail extraction");
            journal.system_error(
                "tesseract",
                "OCR engine is not available. Install Tesseract and poppler-utils to enable the fallback.",
            );
        }

        Self {
            artifacts: ArtifactStore::new(&workspace),
            sink: ResultSink::new(workspace.report_dir()),
            workspace,
            extraction,
            standardizer,
            analyzer,
            journal,
            ocr_available,
            documents: BTreeMap::new(),
        }
    }

    pub fn is_ocr_available(&self) -> bool {
        self.ocr_available
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn consolidated_report_path(&self) -> PathBuf {
        self.sink.generate_csv_report()
    }

    /// Documents seen so far in this process, ordered by id.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn document(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    /// Extracts every supported document in the input directory.
    pub fn extract(
        &mut self,
        force: bool,
        progress: &dyn ProgressReporter,
    ) -> Result<StageReport, PipelineError> {
        self.workspace.ensure_all()?;
        progress.report(ProgressEvent::OcrStatus {
            available: self.ocr_available,
        });

        let sources = DirectoryScanner::new(self.workspace.input_dir(), Stage::Extraction).scan();
        self.warn_shared_stems(&sources);
        Ok(self.run_stage(Stage::Extraction, sources, force, progress))
    }

    /// Sources differing only by extension share one extraction artifact;
    /// every one after the first is journaled.
    fn warn_shared_stems(&self, sources: &[PathBuf]) {
        let mut owners: BTreeMap<String, String> = BTreeMap::new();
        for source in sources {
            let file = sanitize::redact_path(source);
            match owners.get(&document_stem(source)) {
                Some(owner) => {
                    warn!(file = %file, owner = %owner, "Source shares its output name");
                    self.journal.error(
                        Stage::Extraction,
                        &file,
                        &format!(
                            "Shares its output name with {}; only one of them is extracted without --force",
                            owner
                        ),
                    );
                }
                None => {
                    owners.insert(document_stem(source), file);
                }
            }
        }
    }

    /// Standardizes one named extraction artifact, or all of them.
    /// A named file resolves against the extracted directory.
    pub fn standardize(
        &mut self,
        file: Option<&Path>,
        force: bool,
        progress: &dyn ProgressReporter,
    ) -> Result<StageReport, PipelineError> {
        self.workspace.ensure_all()?;
        let inputs = match file {
            Some(file) => vec![self.resolve_named(Stage::Standardization, file)?],
            None => DirectoryScanner::new(self.workspace.extracted_dir(), Stage::Standardization)
                .scan(),
        };
        Ok(self.run_stage(Stage::Standardization, inputs, force, progress))
    }

    /// Analyzes one named standardized artifact, or all of them.
    /// A named file resolves against the processed directory.
    pub fn analyze(
        &mut self,
        file: Option<&Path>,
        force: bool,
        progress: &dyn ProgressReporter,
    ) -> Result<AnalysisRun, PipelineError> {
        self.workspace.ensure_all()?;
        let inputs = match file {
            Some(file) => vec![self.resolve_named(Stage::Analysis, file)?],
            None => DirectoryScanner::new(self.workspace.processed_dir(), Stage::Analysis).scan(),
        };
        Ok(self.analyze_inputs(inputs, force, progress))
    }

    /// Full run. Each stage consumes exactly the artifacts the previous one
    /// made available; a stage that makes none fails the run.
    pub fn run_all(
        &mut self,
        force: bool,
        progress: &dyn ProgressReporter,
    ) -> Result<PipelineRun, PipelineError> {
        let _span = info_span!("pipeline.run_all", force).entered();

        progress.report(ProgressEvent::StageStarted {
            stage: Stage::Extraction,
        });
        let extraction = self.extract(force, progress)?;
        ensure_produced(&extraction)?;

        progress.report(ProgressEvent::StageStarted {
            stage: Stage::Standardization,
        });
        let standardization =
            self.run_stage(Stage::Standardization, extraction.produced(), force, progress);
        ensure_produced(&standardization)?;

        progress.report(ProgressEvent::StageStarted {
            stage: Stage::Analysis,
        });
        let analysis = self.analyze_inputs(standardization.produced(), force, progress);
        ensure_produced(&analysis.report)?;

        Ok(PipelineRun {
            extraction,
            standardization,
            analysis,
        })
    }

    /// Resolves a caller-named stage input and checks it exists before any
    /// work is dispatched.
    pub fn resolve_named(&self, stage: Stage, file: &Path) -> Result<PathBuf, PipelineError> {
        let candidate = if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.stage_input_dir(stage).join(file)
        };

        if candidate.is_file() {
            Ok(candidate)
        } else {
            Err(PipelineError::NotFound { path: candidate })
        }
    }

    fn stage_input_dir(&self, stage: Stage) -> PathBuf {
        match stage {
            Stage::Extraction => self.workspace.input_dir(),
            Stage::Standardization => self.workspace.extracted_dir(),
            Stage::Analysis => self.workspace.processed_dir(),
        }
    }

    fn analyze_inputs(
        &mut self,
        inputs: Vec<PathBuf>,
        force: bool,
        progress: &dyn ProgressReporter,
    ) -> AnalysisRun {
        let report = self.run_stage(Stage::Analysis, inputs, force, progress);

        let consolidated = (report.done_count() > 0).then(|| self.sink.generate_csv_report());
        if let Some(path) = &consolidated {
            progress.report(ProgressEvent::ReportReady { path: path.clone() });
        }

        AnalysisRun {
            report,
            consolidated,
        }
    }

    fn run_stage(
        &mut self,
        stage: Stage,
        inputs: Vec<PathBuf>,
        force: bool,
        progress: &dyn ProgressReporter,
    ) -> StageReport {
        let _span = info_span!("pipeline.stage", stage = stage.log_name(), inputs = inputs.len())
            .entered();

        let mut report = StageReport::new(stage);
        for input in inputs {
            let result = self.run_document(stage, &input, force, progress);
            report.results.push(result);
        }

        info!(
            done = report.done_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "{} stage finished",
            stage
        );
        report
    }

    fn run_document(
        &mut self,
        stage: Stage,
        input: &Path,
        force: bool,
        progress: &dyn ProgressReporter,
    ) -> DocumentResult {
        let file = sanitize::redact_path(input);
        let stem = document_stem(input);
        let _span = info_span!("pipeline.document", stage = stage.log_name(), file = %file)
            .entered();

        self.transition(input, &stem, stage, StageState::InProgress);

        let outcome = if !force && self.artifacts.exists(stage, &stem) {
            debug!("Artifact already present, skipping");
            progress.report(ProgressEvent::Skipped {
                stage,
                file: file.clone(),
            });
            StageOutcome::Skipped {
                artifact: self.artifacts.artifact_path(stage, &stem),
            }
        } else {
            progress.report(ProgressEvent::Started {
                stage,
                file: file.clone(),
            });

            let result = match stage {
                Stage::Extraction => self.extract_document(input, &stem, &file, progress),
                Stage::Standardization => self.standardize_document(input, &stem),
                Stage::Analysis => self.analyze_document(input, &stem, &file),
            };

            match result {
                Ok(produced) => {
                    debug!(
                        artifact = %sanitize::redact_path(&produced.artifact),
                        "Artifact written"
                    );
                    progress.report(ProgressEvent::Completed {
                        stage,
                        file: file.clone(),
                        degraded: produced.degraded,
                    });
                    StageOutcome::Done {
                        artifact: produced.artifact,
                    }
                }
                Err(failure) => {
                    warn!(error = %failure, "Document failed");
                    self.journal.error(stage, &file, &failure.to_string());
                    progress.report(ProgressEvent::Failed {
                        stage,
                        file: file.clone(),
                        error: failure.to_string(),
                    });
                    StageOutcome::Failed(failure)
                }
            }
        };

        self.transition(input, &stem, stage, outcome.state());
        DocumentResult {
            file,
            document_id: stem,
            outcome,
        }
    }

    /// Primary decode, then OCR when the decode fails or yields no text.
    fn extract_document(
        &self,
        source: &Path,
        stem: &str,
        file: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<Produced, DocumentFailure> {
        let reason = match self.extraction.extract(source) {
            Ok(text) if !text.trim().is_empty() => {
                return self.store(Stage::Extraction, stem, &text);
            }
            Ok(_) => FallbackReason::EmptyText,
            Err(e) => FallbackReason::DecodeFailed(e.to_string()),
        };

        if !self.ocr_available {
            return Err(match reason {
                FallbackReason::DecodeFailed(msg) => DocumentFailure::Decode(msg),
                FallbackReason::EmptyText => DocumentFailure::EmptyOutput {
                    reason: EMPTY_WITHOUT_OCR.to_string(),
                },
            });
        }

        match &reason {
            FallbackReason::EmptyText => {
                self.journal
                    .info(Stage::Extraction, file, "Empty text, using OCR as fallback");
            }
            FallbackReason::DecodeFailed(msg) => {
                warn!(error = %msg, "Primary extraction failed, trying OCR");
                self.journal.error(Stage::Extraction, file, msg);
            }
        }
        progress.report(ProgressEvent::Fallback {
            file: file.to_string(),
            reason,
        });

        let ocr = self.extraction.extract_with_ocr(source);
        if let Some(diagnostic) = &ocr.diagnostic {
            self.journal.error(Stage::Extraction, file, diagnostic);
        }
        if ocr.is_empty() {
            return Err(DocumentFailure::EmptyOutput {
                reason: EMPTY_AFTER_OCR.to_string(),
            });
        }

        self.journal
            .info(Stage::Extraction, file, "OCR extraction successful");
        progress.report(ProgressEvent::Recovered {
            file: file.to_string(),
        });
        self.store(Stage::Extraction, stem, &ocr.text)
    }

    fn standardize_document(&self, input: &Path, stem: &str) -> Result<Produced, DocumentFailure> {
        let raw = self.read_input(input)?;
        if raw.trim().is_empty() {
            return Err(DocumentFailure::EmptyOutput {
                reason: "Text file is empty".to_string(),
            });
        }

        let canonical = self
            .standardizer
            .standardize(&raw)
            .map_err(|e| DocumentFailure::Generation(e.to_string()))?;
        if canonical.trim().is_empty() {
            return Err(DocumentFailure::EmptyOutput {
                reason: "Standardization returned empty text".to_string(),
            });
        }

        self.store(Stage::Standardization, stem, &canonical)
    }

    fn analyze_document(
        &self,
        input: &Path,
        stem: &str,
        file: &str,
    ) -> Result<Produced, DocumentFailure> {
        let canonical = self.read_input(input)?;
        if canonical.trim().is_empty() {
            return Err(DocumentFailure::EmptyOutput {
                reason: "Standardized file is empty".to_string(),
            });
        }

        let outcome = self
            .analyzer
            .analyze(&canonical)
            .map_err(|e| DocumentFailure::Generation(e.to_string()))?;
        if outcome.report().trim().is_empty() {
            return Err(DocumentFailure::EmptyOutput {
                reason: "Analysis returned invalid data".to_string(),
            });
        }

        // The artifact marks the document as analyzed, so it is written only
        // once its row is in the report
        self.sink
            .append(file, &outcome)
            .map_err(|e| DocumentFailure::Report(e.to_string()))?;

        let mut produced = self.store(Stage::Analysis, stem, outcome.report())?;
        if outcome.is_degraded() {
            self.journal.error(
                Stage::Analysis,
                file,
                crate::ai::UNPARSEABLE_MARKER,
            );
            produced.degraded = true;
        }
        Ok(produced)
    }

    fn read_input(&self, input: &Path) -> Result<String, DocumentFailure> {
        self.artifacts
            .read(input)
            .map_err(|e| DocumentFailure::Storage(e.to_string()))
    }

    fn store(&self, stage: Stage, stem: &str, content: &str) -> Result<Produced, DocumentFailure> {
        self.artifacts
            .write(stage, stem, content)
            .map(Produced::plain)
            .map_err(|e| DocumentFailure::Storage(e.to_string()))
    }

    fn transition(&mut self, input: &Path, stem: &str, stage: Stage, state: StageState) {
        self.documents
            .entry(stem.to_string())
            .or_insert_with(|| Document::new(input))
            .set_state(stage, state);
    }
}

fn ensure_produced(report: &StageReport) -> Result<(), PipelineError> {
    if report.produced_nothing() {
        warn!("{} stage produced no artifacts", report.stage);
        return Err(PipelineError::StageProducedNothing {
            stage: report.stage,
        });
    }
    Ok(())
}
