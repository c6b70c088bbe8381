//! The consolidated per-day analysis table.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{Local, NaiveDate};
use encoding_rs::{EncoderResult, WINDOWS_1252};

use crate::ai::record::{format_score, AnalysisOutcome, NOT_AVAILABLE};
use crate::config::workspace::ensure_directory;
use crate::error::ReportError;

pub const DELIMITER: u8 = b';';

pub const HEADER: [&str; 8] = [
    "File",
    "Name",
    "Email",
    "Incomplete Info",
    "Education",
    "Key Skills",
    "Score",
    "Sentiment",
];

struct OpenReport {
    day: NaiveDate,
    path: PathBuf,
    file: File,
}

/// Append-only sink for analysis rows, one Windows-1252 file per local day.
///
/// The header is written only by whoever creates the day's file, so any
/// number of sinks and runs on one day share a single header row. Appends
/// are serialized through an internal lock.
pub struct ResultSink {
    report_dir: PathBuf,
    current: Mutex<Option<OpenReport>>,
}

impl ResultSink {
    pub fn new<P: AsRef<Path>>(report_dir: P) -> Self {
        Self {
            report_dir: report_dir.as_ref().to_path_buf(),
            current: Mutex::new(None),
        }
    }

    pub fn report_path_for(&self, day: NaiveDate) -> PathBuf {
        self.report_dir
            .join(format!("consolidated_analysis_{}.csv", day.format("%Y-%m-%d")))
    }

    /// Path of today's table, whether or not any row has been written.
    pub fn generate_csv_report(&self) -> PathBuf {
        self.report_path_for(Local::now().date_naive())
    }

    pub fn append(&self, document_file: &str, outcome: &AnalysisOutcome) -> Result<(), ReportError> {
        self.append_for_day(Local::now().date_naive(), document_file, outcome)
    }

    pub fn append_for_day(
        &self,
        day: NaiveDate,
        document_file: &str,
        outcome: &AnalysisOutcome,
    ) -> Result<(), ReportError> {
        let row = encode_cp1252(&format_row(&row_fields(document_file, outcome))?);

        let mut guard = self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Reopen when the local day rolled over since the last row
        let open = match guard.take() {
            Some(open) if open.day == day => guard.insert(open),
            _ => guard.insert(self.open_day(day)?),
        };
        open.file
            .write_all(&row)
            .and_then(|()| open.file.flush())
            .map_err(|e| ReportError::Append {
                path: open.path.clone(),
                source: e,
            })
    }

    fn open_day(&self, day: NaiveDate) -> Result<OpenReport, ReportError> {
        ensure_directory(&self.report_dir)?;
        let path = self.report_path_for(day);

        let file = match OpenOptions::new().append(true).create_new(true).open(&path) {
            Ok(mut file) => {
                let header = encode_cp1252(&format_row(&HEADER)?);
                file.write_all(&header)
                    .and_then(|()| file.flush())
                    .map_err(|e| ReportError::Append {
                        path: path.clone(),
                        source: e,
                    })?;
                tracing::info!(report = %path.display(), "Created consolidated report");
                file
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => OpenOptions::new()
                .append(true)
                .open(&path)
                .map_err(|e| ReportError::Open {
                    path: path.clone(),
                    source: e,
                })?,
            Err(e) => {
                return Err(ReportError::Open { path, source: e });
            }
        };

        Ok(OpenReport { day, path, file })
    }
}

/// Columns in header order. Degraded analyses fill every data column with
/// the placeholder.
fn row_fields(document_file: &str, outcome: &AnalysisOutcome) -> [String; 8] {
    match outcome.summary() {
        Some(summary) => [
            document_file.to_string(),
            summary.name.clone(),
            summary.email.clone(),
            summary.incomplete_info.clone(),
            summary.education.clone(),
            summary.key_skills.clone(),
            format_score(summary.score),
            summary.sentiment.clone(),
        ],
        None => std::array::from_fn(|i| match i {
            0 => document_file.to_string(),
            _ => NOT_AVAILABLE.to_string(),
        }),
    }
}

/// One `;`-separated line. Fields holding the delimiter, a quote or a line
/// break are quoted, with embedded quotes doubled.
fn format_row<S: AsRef<str>>(fields: &[S]) -> Result<String, ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(fields.iter().map(|f| f.as_ref()))
        .map_err(|e| ReportError::Encode(e.to_string()))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Encode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::Encode(e.to_string()))
}

/// Transcodes to Windows-1252, writing `?` for characters it cannot represent.
pub fn encode_cp1252(text: &str) -> Vec<u8> {
    let mut encoder = WINDOWS_1252.new_encoder();
    let mut out = Vec::with_capacity(text.len());
    let mut buffer = [0u8; 1024];
    let mut input = text;

    loop {
        let (result, read, written) =
            encoder.encode_from_utf8_without_replacement(input, &mut buffer, true);
        out.extend_from_slice(&buffer[..written]);
        input = &input[read..];
        match result {
            EncoderResult::InputEmpty => return out,
            EncoderResult::OutputFull => {}
            EncoderResult::Unmappable(_) => out.push(b'?'),
        }
    }
}
