pub mod docx;
pub mod ocr;
pub mod pdf;

use std::path::Path;
use std::sync::Arc;

use crate::config::schema::DocumentFormat;
use crate::error::ProcessError;

pub use docx::DocxDecoder;
pub use ocr::{language_hint, OcrEngine, OcrOutput, TesseractOcr};
pub use pdf::PdfDecoder;

/// Byte-level decoder for one document format.
pub trait DocumentDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<String, ProcessError>;
    fn supports(&self, format: DocumentFormat) -> bool;
}

/// Turns one source document into plain text.
///
/// `extract` propagates decoder failures; the caller decides whether to try
/// [`ExtractionStage::extract_with_ocr`]. The OCR path never fails.
pub struct ExtractionStage {
    decoders: Vec<Box<dyn DocumentDecoder>>,
    ocr: Arc<dyn OcrEngine>,
    language_hint: &'static str,
    max_document_bytes: u64,
}

impl ExtractionStage {
    pub fn new(
        decoders: Vec<Box<dyn DocumentDecoder>>,
        ocr: Arc<dyn OcrEngine>,
        output_language: &str,
        max_document_bytes: u64,
    ) -> Self {
        Self {
            decoders,
            ocr,
            language_hint: language_hint(output_language),
            max_document_bytes,
        }
    }

    /// PDF and DOCX decoders backed by lopdf and zip/quick-xml. The byte
    /// limit also bounds the uncompressed DOCX body.
    pub fn default_decoders(max_document_bytes: u64) -> Vec<Box<dyn DocumentDecoder>> {
        vec![
            Box::new(PdfDecoder::new()),
            Box::new(DocxDecoder::with_limit(max_document_bytes)),
        ]
    }

    pub fn language_hint(&self) -> &'static str {
        self.language_hint
    }

    pub fn is_ocr_available(&self) -> bool {
        self.ocr.is_available()
    }

    /// Unsupported formats yield empty text rather than an error.
    pub fn extract(&self, path: &Path) -> Result<String, ProcessError> {
        let format = DocumentFormat::from_path(path);
        let Some(decoder) = self.decoders.iter().find(|d| d.supports(format)) else {
            return Ok(String::new());
        };

        let size = std::fs::metadata(path)
            .map_err(|e| ProcessError::ReadDocument {
                path: path.to_path_buf(),
                source: e,
            })?
            .len();
        if size > self.max_document_bytes {
            return Err(ProcessError::ResourceExhausted {
                path: path.to_path_buf(),
                size,
                limit: self.max_document_bytes,
            });
        }

        decoder.decode(path)
    }

    pub fn extract_with_ocr(&self, path: &Path) -> OcrOutput {
        self.ocr.recognize(path, self.language_hint)
    }
}
