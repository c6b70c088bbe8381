use std::io::Write;
use std::path::PathBuf;

use super::stage::Stage;

/// Why extraction moved on to OCR.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    EmptyText,
    DecodeFailed(String),
}

/// Incremental progress emitted by the orchestrator, one event per step.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    StageStarted {
        stage: Stage,
    },
    OcrStatus {
        available: bool,
    },
    Skipped {
        stage: Stage,
        file: String,
    },
    Started {
        stage: Stage,
        file: String,
    },
    Fallback {
        file: String,
        reason: FallbackReason,
    },
    Recovered {
        file: String,
    },
    Completed {
        stage: Stage,
        file: String,
        degraded: bool,
    },
    Failed {
        stage: Stage,
        file: String,
        error: String,
    },
    ReportReady {
        path: PathBuf,
    },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Prints one line per event on stdout, as the batch runs.
pub struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        let line = render_event(&event);
        let mut stdout = std::io::stdout().lock();
        // A closed stdout must not abort the batch
        let _ = writeln!(stdout, "{}", line);
    }
}

pub fn render_event(event: &ProgressEvent) -> String {
    match event {
        ProgressEvent::StageStarted { stage } => {
            let step = match stage {
                Stage::Extraction => 1,
                Stage::Standardization => 2,
                Stage::Analysis => 3,
            };
            format!("\n=== STEP {}: {} ===", step, stage.label().to_uppercase())
        }
        ProgressEvent::OcrStatus { available: true } => {
            "✓ OCR available as fallback for problematic PDFs\n".to_string()
        }
        ProgressEvent::OcrStatus { available: false } => {
            "! OCR not available. Problematic files may fail extraction\n".to_string()
        }
        ProgressEvent::Skipped { stage, file } => {
            format!("- Skipping {} (already {})", file, past_tense(*stage))
        }
        ProgressEvent::Started { stage, file } => {
            let action = match stage {
                Stage::Extraction => "Extracting data from CV",
                Stage::Standardization => "Standardizing CV data",
                Stage::Analysis => "Analyzing CV data",
            };
            format!("- {}: {}", action, file)
        }
        ProgressEvent::Fallback {
            reason: FallbackReason::EmptyText,
            ..
        } => "  ! Empty extracted text. Trying OCR as fallback...".to_string(),
        ProgressEvent::Fallback {
            file,
            reason: FallbackReason::DecodeFailed(error),
        } => format!(
            "  ! Error processing {}: {}\n  ! Trying OCR as fallback after error...",
            file, error
        ),
        ProgressEvent::Recovered { .. } => "  ✓ Text successfully extracted using OCR".to_string(),
        ProgressEvent::Completed {
            stage,
            degraded: false,
            ..
        } => format!("  ✓ {} completed successfully", stage.label()),
        ProgressEvent::Completed {
            stage,
            degraded: true,
            ..
        } => format!(
            "  ! {} completed, but the model output was not valid JSON",
            stage.label()
        ),
        ProgressEvent::Failed { file, error, .. } => {
            format!("  ! Error processing {}: {}", file, error)
        }
        ProgressEvent::ReportReady { path } => {
            format!("Report generated at: {}", path.display())
        }
    }
}

fn past_tense(stage: Stage) -> &'static str {
    match stage {
        Stage::Extraction => "extracted",
        Stage::Standardization => "processed",
        Stage::Analysis => "analyzed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_skip_and_start() {
        assert_eq!(
            render_event(&ProgressEvent::Skipped {
                stage: Stage::Extraction,
                file: "cv.pdf".to_string(),
            }),
            "- Skipping cv.pdf (already extracted)"
        );
        assert_eq!(
            render_event(&ProgressEvent::Started {
                stage: Stage::Analysis,
                file: "cv_standardized.txt".to_string(),
            }),
            "- Analyzing CV data: cv_standardized.txt"
        );
    }

    #[test]
    fn test_render_banner_and_report() {
        assert_eq!(
            render_event(&ProgressEvent::StageStarted {
                stage: Stage::Standardization
            }),
            "\n=== STEP 2: STANDARDIZATION ==="
        );
        assert_eq!(
            render_event(&ProgressEvent::ReportReady {
                path: PathBuf::from("report/consolidated_analysis_2024-03-09.csv"),
            }),
            "Report generated at: report/consolidated_analysis_2024-03-09.csv"
        );
    }

    #[test]
    fn test_render_fallback_reasons() {
        let empty = render_event(&ProgressEvent::Fallback {
            file: "cv.pdf".to_string(),
            reason: FallbackReason::EmptyText,
        });
        assert!(empty.contains("Empty extracted text"));

        let failed = render_event(&ProgressEvent::Fallback {
            file: "cv.pdf".to_string(),
            reason: FallbackReason::DecodeFailed("bad xref".to_string()),
        });
        assert!(failed.contains("Error processing cv.pdf: bad xref"));
        assert!(failed.ends_with("Trying OCR as fallback after error..."));
    }
}
