use std::path::Path;
use std::process::Command;

use crate::config::schema::DocumentFormat;
use crate::error::ProcessError;
use crate::processor::DocumentDecoder;

/// Native text layer extraction with lopdf.
pub struct PdfDecoder;

impl PdfDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentDecoder for PdfDecoder {
    fn decode(&self, path: &Path) -> Result<String, ProcessError> {
        let _span = tracing::info_span!("processor.pdf").entered();

        let pdf_bytes = std::fs::read(path).map_err(|e| ProcessError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let doc = lopdf::Document::load_mem(&pdf_bytes)
            .map_err(|e| ProcessError::PdfProcessing(format!("Failed to load PDF: {}", e)))?;

        let text = extract_text_from_pdf(&doc);

        // A text layer made of font-encoding noise is no text layer at all.
        if is_unusable_text(&text) {
            tracing::debug!("PDF text layer unusable, reporting empty text");
            return Ok(String::new());
        }

        Ok(text)
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Pdf)
    }
}

fn extract_text_from_pdf(doc: &lopdf::Document) -> String {
    let mut text = String::new();

    for (page_num, _) in doc.get_pages() {
        if let Ok(page_text) = doc.extract_text(&[page_num]) {
            text.push_str(&page_text);
            text.push('\n');
        }
    }

    text
}

/// Marker lopdf emits for glyphs in CID fonts it cannot map.
const IDENTITY_H_PATTERN: &str = "?Identity-H Unimplemented?";

/// Text shorter than this is accepted regardless of composition.
const MIN_TOTAL_CHARS: usize = 50;

const MIN_ALPHANUMERIC_PERCENT: usize = 10;

/// True when the extracted text is whitespace, only Identity-H markers, or
/// mostly non-alphanumeric garbage.
fn is_unusable_text(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return true;
    }

    let cleaned = trimmed
        .replace(IDENTITY_H_PATTERN, "")
        .replace(['\n', ' '], "");
    if cleaned.is_empty() {
        return true;
    }

    let total_chars = trimmed.chars().count();
    let alphanumeric_chars = trimmed.chars().filter(|c| c.is_alphanumeric()).count();

    total_chars > MIN_TOTAL_CHARS && alphanumeric_chars * 100 < total_chars * MIN_ALPHANUMERIC_PERCENT
}

/// Page count of a PDF on disk. Tries lopdf first and falls back to
/// `pdfinfo` for files lopdf cannot parse.
pub(crate) fn count_pdf_pages(path: &Path) -> Result<usize, ProcessError> {
    if let Ok(doc) = lopdf::Document::load(path) {
        return Ok(doc.get_pages().len());
    }

    let output = Command::new("pdfinfo").arg(path).output().map_err(|e| {
        ProcessError::PdfProcessing(format!(
            "Failed to run pdfinfo: {}. Make sure poppler-utils is installed.",
            e
        ))
    })?;

    if !output.status.success() {
        return Err(ProcessError::PdfProcessing(format!(
            "pdfinfo failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        if let Some(count_str) = line.strip_prefix("Pages:") {
            if let Ok(count) = count_str.trim().parse::<usize>() {
                return Ok(count);
            }
        }
    }

    Ok(1)
}
