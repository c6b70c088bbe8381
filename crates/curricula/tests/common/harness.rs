//! Test harness for isolated pipeline runs.
//!
//! The `TestHarness` owns a temporary base directory laid out like a real
//! workspace and wires scripted collaborators into a [`Pipeline`].

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use curricula::ai::{Analyzer, GenerativeModel, Standardizer};
use curricula::config::{EvaluationCriteria, EvaluationCriterion, JobRequirements, Workspace};
use curricula::pipeline::{Pipeline, ProgressEvent, ProgressReporter};
use curricula::processor::{DocumentDecoder, ExtractionStage, OcrEngine};

/// Test harness providing an isolated workspace for integration tests.
pub struct TestHarness {
    temp_dir: TempDir,
    pub workspace: Workspace,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let workspace = Workspace::with_defaults(temp_dir.path());
        workspace.ensure_all().expect("Failed to create workspace");

        Self {
            temp_dir,
            workspace,
        }
    }

    pub fn base(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write_input(&self, filename: &str, content: &[u8]) -> PathBuf {
        let path = self.workspace.input_dir().join(filename);
        std::fs::write(&path, content).expect("Failed to write input file");
        path
    }

    pub fn write_extracted(&self, filename: &str, content: &str) -> PathBuf {
        let path = self.workspace.extracted_dir().join(filename);
        std::fs::write(&path, content).expect("Failed to write extracted file");
        path
    }

    pub fn write_standardized(&self, filename: &str, content: &str) -> PathBuf {
        let path = self.workspace.processed_dir().join(filename);
        std::fs::write(&path, content).expect("Failed to write standardized file");
        path
    }

    pub fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
    }

    /// Text of every journal file for a log scope, concatenated.
    pub fn journal(&self, scope: &str) -> String {
        let dir = self.workspace.stage_log_dir(scope);
        let mut entries: Vec<PathBuf> = std::fs::read_dir(&dir)
            .map(|rd| rd.filter_map(|e| e.ok()).map(|e| e.path()).collect())
            .unwrap_or_default();
        entries.sort();
        entries
            .iter()
            .map(|p| std::fs::read_to_string(p).unwrap_or_default())
            .collect()
    }

    pub fn pipeline(
        &self,
        decoder: impl DocumentDecoder + 'static,
        ocr: Arc<dyn OcrEngine>,
        model: Arc<dyn GenerativeModel>,
    ) -> Pipeline {
        self.pipeline_with(decoder, ocr, model, requirements("en"))
    }

    pub fn pipeline_with(
        &self,
        decoder: impl DocumentDecoder + 'static,
        ocr: Arc<dyn OcrEngine>,
        model: Arc<dyn GenerativeModel>,
        requirements: JobRequirements,
    ) -> Pipeline {
        let requirements = Arc::new(requirements);
        let extraction = ExtractionStage::new(
            vec![Box::new(decoder)],
            ocr,
            &requirements.output_language,
            1_000_000,
        );

        Pipeline::new(
            self.workspace.clone(),
            extraction,
            Standardizer::new(model.clone(), requirements.clone()),
            Analyzer::new(model, requirements),
        )
    }
}

pub fn requirements(output_language: &str) -> JobRequirements {
    JobRequirements {
        output_language: output_language.to_string(),
        job_description: "Build payment services in Go".to_string(),
        position: "Backend Engineer".to_string(),
        evaluation_criteria: EvaluationCriteria::new(vec![
            (
                "technical_skills".to_string(),
                EvaluationCriterion {
                    weight: 0.7,
                    description: "Go and SQL".to_string(),
                },
            ),
            (
                "experience".to_string(),
                EvaluationCriterion {
                    weight: 0.3,
                    description: "Production backend work".to_string(),
                },
            ),
        ]),
        directories: None,
    }
}

/// Progress reporter that keeps every event for later assertions.
#[derive(Default)]
pub struct RecordingProgress {
    events: std::sync::Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingProgress {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// A valid one-page PDF with an empty content stream: no text layer at all,
/// like a scanned résumé.
pub fn blank_pdf() -> Vec<u8> {
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("Failed to serialize PDF");
    bytes
}
