//! End-to-end run over a scanned résumé: a PDF with no text layer goes
//! through OCR, standardization and analysis into the daily table.

mod common;

use std::sync::Arc;

use common::*;

use curricula::pipeline::{NoopProgress, ProgressEvent};
use curricula::processor::PdfDecoder;

#[test]
fn test_scanned_pdf_reaches_consolidated_report() {
    let harness = TestHarness::new();
    harness.write_input("john_doe.pdf", &blank_pdf());

    let ocr = Arc::new(ScriptedOcr::returning("John Doe\nSkills: Go"));
    let model = Arc::new(ScriptedModel::with_analysis(&analysis_json("John Doe", 72)));
    let mut pipeline = harness.pipeline(PdfDecoder::new(), ocr.clone(), model.clone());

    let progress = RecordingProgress::default();
    let run = pipeline.run_all(false, &progress).unwrap();

    // Extraction fell back to OCR and kept its text verbatim
    let extracted = harness.workspace.extracted_dir().join("john_doe.txt");
    assert_eq!(harness.read(&extracted), "John Doe\nSkills: Go");
    assert_eq!(ocr.calls().len(), 1);

    // Standardization saw the OCR text, analysis saw the canonical document
    let calls = model.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].is_standardization());
    assert!(calls[0].user.ends_with("John Doe\nSkills: Go"));
    assert!(calls[1].user.contains(CANONICAL_CV));
    assert!(calls[1].system.contains("Technical skills (weight: 0.70): Go and SQL"));

    let standardized = harness
        .workspace
        .processed_dir()
        .join("john_doe_standardized.txt");
    assert_eq!(harness.read(&standardized), CANONICAL_CV);

    let analysis = harness.workspace.analysis_dir().join("john_doe_analysis.txt");
    assert_eq!(harness.read(&analysis), "## Strengths\n- Go");

    let report_path = run.analysis.consolidated.expect("a row was appended");
    let report = harness.read(&report_path);
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[1],
        "john_doe_standardized.txt;John Doe;john@example.com;;BSc;Go;72;Positive"
    );
    assert!(progress
        .events()
        .contains(&ProgressEvent::ReportReady { path: report_path }));
}

#[test]
fn test_second_run_is_a_no_op() {
    let harness = TestHarness::new();
    harness.write_input("john_doe.pdf", &blank_pdf());

    let model = Arc::new(ScriptedModel::with_analysis(&analysis_json("John Doe", 72)));
    let mut pipeline = harness.pipeline(
        PdfDecoder::new(),
        Arc::new(ScriptedOcr::returning("John Doe")),
        model.clone(),
    );

    pipeline.run_all(false, &NoopProgress).unwrap();
    let report_path = pipeline.consolidated_report_path();
    let before = harness.read(&report_path);

    let second = pipeline.run_all(false, &NoopProgress).unwrap();
    assert_eq!(second.extraction.skipped_count(), 1);
    assert_eq!(second.standardization.skipped_count(), 1);
    assert_eq!(second.analysis.report.skipped_count(), 1);
    assert!(second.analysis.consolidated.is_none());
    assert_eq!(model.calls().len(), 2);
    assert_eq!(harness.read(&report_path), before);
}

#[test]
fn test_unparseable_analysis_still_lands_in_report() {
    let harness = TestHarness::new();
    harness.write_standardized("jane_standardized.txt", CANONICAL_CV);

    let prose = "The candidate seems fine, but I will not format this as JSON.";
    let model = Arc::new(ScriptedModel::with_analysis(prose));
    let mut pipeline = harness.pipeline(
        PdfDecoder::new(),
        Arc::new(ScriptedOcr::unavailable()),
        model,
    );

    let progress = RecordingProgress::default();
    let run = pipeline.analyze(None, false, &progress).unwrap();

    assert_eq!(run.report.done_count(), 1);
    assert!(progress.events().contains(&ProgressEvent::Completed {
        stage: curricula::pipeline::Stage::Analysis,
        file: "jane_standardized.txt".to_string(),
        degraded: true,
    }));

    let analysis = harness.workspace.analysis_dir().join("jane_analysis.txt");
    assert_eq!(harness.read(&analysis), prose);

    let report_path = run.consolidated.clone().expect("degraded rows are still appended");
    let report = harness.read(&report_path);
    assert_eq!(
        report.lines().nth(1),
        Some("jane_standardized.txt;N/A;N/A;N/A;N/A;N/A;N/A;N/A")
    );
    assert!(harness.journal("analyze").contains("Model did not return valid JSON"));
}
