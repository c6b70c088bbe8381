//! Per-stage diagnostic files under the log directory.
//!
//! Every record lands in `<log>/<scope>/<level>_<YYYY-MM-DD>.log`. The
//! journal runs alongside tracing and never fails a document: write
//! problems are only warned about.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::config::workspace::{ensure_directory, SYSTEM_LOG_SCOPE};

use super::stage::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalLevel {
    Error,
    Info,
}

impl JournalLevel {
    fn file_prefix(&self) -> &'static str {
        match self {
            JournalLevel::Error => "error",
            JournalLevel::Info => "info",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            JournalLevel::Error => "Error",
            JournalLevel::Info => "Info",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StageJournal {
    log_dir: PathBuf,
}

impl StageJournal {
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Self {
        Self {
            log_dir: log_dir.as_ref().to_path_buf(),
        }
    }

    pub fn error(&self, stage: Stage, file: &str, message: &str) {
        self.record(stage.log_name(), JournalLevel::Error, file, message);
    }

    pub fn info(&self, stage: Stage, file: &str, message: &str) {
        self.record(stage.log_name(), JournalLevel::Info, file, message);
    }

    /// Run-level diagnostics that belong to no stage, e.g. the OCR probe.
    pub fn system_error(&self, file: &str, message: &str) {
        self.record(SYSTEM_LOG_SCOPE, JournalLevel::Error, file, message);
    }

    pub fn journal_path(&self, scope: &str, level: JournalLevel, day: chrono::NaiveDate) -> PathBuf {
        self.log_dir.join(scope).join(format!(
            "{}_{}.log",
            level.file_prefix(),
            day.format("%Y-%m-%d")
        ))
    }

    fn record(&self, scope: &str, level: JournalLevel, file: &str, message: &str) {
        let now = Local::now().naive_local();
        if let Err(e) = self.write_record(scope, level, now, file, message) {
            tracing::warn!(scope, error = %e, "Failed to write stage journal");
        }
    }

    fn write_record(
        &self,
        scope: &str,
        level: JournalLevel,
        at: NaiveDateTime,
        file: &str,
        message: &str,
    ) -> std::io::Result<()> {
        let path = self.journal_path(scope, level, at.date());
        if let Some(dir) = path.parent() {
            ensure_directory(dir).map_err(std::io::Error::other)?;
        }

        let entry = format_entry(level, at, file, message);
        let mut handle = OpenOptions::new().create(true).append(true).open(&path)?;
        handle.write_all(entry.as_bytes())
    }
}

fn format_entry(level: JournalLevel, at: NaiveDateTime, file: &str, message: &str) -> String {
    format!(
        "[{}] File: {}\n{}: {}\n\n",
        at.format("%Y-%m-%d %H:%M:%S"),
        file,
        level.label(),
        message
    )
}
