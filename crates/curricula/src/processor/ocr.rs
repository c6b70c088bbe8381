use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use crate::config::schema::DocumentFormat;
use crate::error::OcrError;
use crate::processor::pdf::count_pdf_pages;

/// Tesseract language used when the configured language has no mapping.
pub const BASELINE_LANGUAGE: &str = "eng";

/// Maps the configured output language onto a Tesseract language code.
/// Unknown languages fall back to the baseline instead of failing.
pub fn language_hint(output_language: &str) -> &'static str {
    if output_language.trim().eq_ignore_ascii_case("pt-br") {
        "por"
    } else {
        BASELINE_LANGUAGE
    }
}

/// Result of an OCR attempt. Errors never escape an [`OcrEngine`]; they are
/// reported as empty text plus a diagnostic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrOutput {
    pub text: String,
    pub diagnostic: Option<String>,
}

impl OcrOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            diagnostic: None,
        }
    }

    pub fn failed(diagnostic: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            diagnostic: Some(diagnostic.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

pub trait OcrEngine: Send + Sync {
    /// Probes whether the engine can run at all on this machine.
    fn is_available(&self) -> bool;

    fn recognize(&self, path: &Path, language_hint: &str) -> OcrOutput;
}

/// Tesseract through leptess, with PDF pages rasterized by `pdftoppm`.
#[derive(Clone)]
pub struct TesseractOcr {
    inner: Arc<TesseractOcrInner>,
}

struct TesseractOcrInner {
    dpi: u32,
    temp_dir: PathBuf,
}

impl TesseractOcr {
    pub fn new<P: AsRef<Path>>(dpi: u32, temp_dir: P) -> Self {
        Self {
            inner: Arc::new(TesseractOcrInner {
                dpi,
                temp_dir: temp_dir.as_ref().to_path_buf(),
            }),
        }
    }

    pub fn dpi(&self) -> u32 {
        self.inner.dpi
    }

    fn recognize_pdf(&self, path: &Path, language: &str) -> Result<String, OcrError> {
        let page_count = count_pdf_pages(path).map_err(|e| OcrError::Render(e.to_string()))?;

        let mut pages = Vec::with_capacity(page_count);
        for page_num in 1..=page_count {
            pages.push(self.render_page(path, page_num as u32)?);
        }

        let text = recognize_pages(&pages, language, None)?;
        if !text.trim().is_empty() {
            return Ok(text);
        }

        // Second pass assumes a page with columns.
        tracing::debug!("OCR produced no text, retrying with page segmentation mode 3");
        recognize_pages(&pages, language, Some("3"))
    }

    fn render_page(&self, pdf_path: &Path, page_num: u32) -> Result<Vec<u8>, OcrError> {
        let output_prefix = self
            .inner
            .temp_dir
            .join(format!("curricula_page_{}", uuid::Uuid::new_v4()));

        let output = Command::new("pdftoppm")
            .arg("-png")
            .arg("-r")
            .arg(self.inner.dpi.to_string())
            .arg("-f")
            .arg(page_num.to_string())
            .arg("-l")
            .arg(page_num.to_string())
            .arg(pdf_path)
            .arg(&output_prefix)
            .output()
            .map_err(|e| {
                OcrError::Render(format!(
                    "Failed to run pdftoppm: {}. Make sure poppler-utils is installed.",
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(OcrError::Render(format!(
                "pdftoppm failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        // pdftoppm pads the page number according to the page count
        let prefix = output_prefix.display();
        let candidates = [
            format!("{}-{}.png", prefix, page_num),
            format!("{}-{:02}.png", prefix, page_num),
            format!("{}-{:03}.png", prefix, page_num),
        ];
        let image_path = candidates
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
            .ok_or_else(|| OcrError::Render("Failed to find rendered page image".to_string()))?;

        let image_data = std::fs::read(&image_path)
            .map_err(|e| OcrError::Render(format!("Failed to read rendered image: {}", e)));
        let _ = std::fs::remove_file(&image_path);

        image_data
    }
}

impl OcrEngine for TesseractOcr {
    fn is_available(&self) -> bool {
        if let Err(e) = leptess::LepTess::new(None, BASELINE_LANGUAGE) {
            tracing::warn!("Tesseract unavailable: {}", e);
            return false;
        }

        match Command::new("pdftoppm").arg("-v").output() {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("pdftoppm unavailable: {}", e);
                false
            }
        }
    }

    fn recognize(&self, path: &Path, language_hint: &str) -> OcrOutput {
        let _span = tracing::info_span!("processor.ocr", language = language_hint).entered();

        let result = match DocumentFormat::from_path(path) {
            DocumentFormat::Pdf => self.recognize_pdf(path, language_hint),
            _ => Err(OcrError::UnsupportedFormat(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_lowercase(),
            )),
        };

        match result {
            Ok(text) => OcrOutput::text(text),
            Err(e) => {
                tracing::warn!("OCR error: {}", e);
                OcrOutput::failed(format!("OCR Error: {}", e))
            }
        }
    }
}

fn recognize_pages(
    pages: &[Vec<u8>],
    language: &str,
    page_seg_mode: Option<&str>,
) -> Result<String, OcrError> {
    let mut lt = leptess::LepTess::new(None, language).map_err(|e| OcrError::Init(e.to_string()))?;
    if let Some(mode) = page_seg_mode {
        lt.set_variable(leptess::Variable::TesseditPagesegMode, mode)
            .map_err(|e| OcrError::Init(e.to_string()))?;
    }

    let mut all_text = String::new();
    for image_data in pages {
        let png_data = normalize_image(image_data)?;
        lt.set_image_from_mem(&png_data)
            .map_err(|e| OcrError::Recognition(format!("Failed to set image for OCR: {}", e)))?;
        let page_text = lt
            .get_utf8_text()
            .map_err(|e| OcrError::Recognition(e.to_string()))?;
        all_text.push_str(&page_text);
        all_text.push('\n');
    }

    Ok(all_text)
}

/// Decodes whatever the renderer produced and re-encodes it as PNG for leptess.
fn normalize_image(image_data: &[u8]) -> Result<Vec<u8>, OcrError> {
    let img = image::load_from_memory(image_data)
        .map_err(|e| OcrError::Recognition(format!("Failed to load image: {}", e)))?;

    let mut png_data = Vec::new();
    img.write_to(&mut Cursor::new(&mut png_data), image::ImageFormat::Png)
        .map_err(|e| OcrError::Recognition(format!("Failed to convert image: {}", e)))?;

    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_hint_mapping() {
        assert_eq!(language_hint("pt-br"), "por");
        assert_eq!(language_hint("PT-BR"), "por");
        assert_eq!(language_hint(" pt-BR "), "por");
        assert_eq!(language_hint("en"), "eng");
        assert_eq!(language_hint("klingon"), "eng");
        assert_eq!(language_hint(""), BASELINE_LANGUAGE);
    }

    #[test]
    fn test_non_pdf_yields_diagnostic_not_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("cv.docx");
        std::fs::write(&path, b"PK").unwrap();

        let ocr = TesseractOcr::new(300, temp_dir.path());
        let output = ocr.recognize(&path, "eng");

        assert!(output.is_empty());
        let diagnostic = output.diagnostic.unwrap();
        assert!(diagnostic.contains("OCR not implemented for format: docx"));
    }

    #[test]
    fn test_invalid_image_data() {
        let result = normalize_image(b"not valid image data");
        match result {
            Err(OcrError::Recognition(msg)) => assert!(msg.contains("Failed to load image")),
            other => panic!("Expected Recognition error, got {:?}", other),
        }
    }

    #[test]
    fn test_ocr_output_helpers() {
        assert!(OcrOutput::text("  \n").is_empty());
        assert!(!OcrOutput::text("John").is_empty());
        let failed = OcrOutput::failed("boom");
        assert!(failed.is_empty());
        assert_eq!(failed.diagnostic.as_deref(), Some("boom"));
    }

    #[test]
    fn test_engine_keeps_dpi() {
        let ocr = TesseractOcr::new(150, std::env::temp_dir());
        assert_eq!(ocr.dpi(), 150);
    }
}
