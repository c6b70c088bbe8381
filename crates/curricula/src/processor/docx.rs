use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::config::schema::DocumentFormat;
use crate::error::ProcessError;
use crate::processor::DocumentDecoder;

/// Reads the paragraphs of `word/document.xml`, one line per paragraph.
///
/// The on-disk size says little about a compressed archive, so the
/// uncompressed part is held to its own byte limit.
pub struct DocxDecoder {
    max_xml_bytes: u64,
}

impl DocxDecoder {
    pub fn new() -> Self {
        Self {
            max_xml_bytes: u64::MAX,
        }
    }

    pub fn with_limit(max_xml_bytes: u64) -> Self {
        Self { max_xml_bytes }
    }
}

impl Default for DocxDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentDecoder for DocxDecoder {
    fn decode(&self, path: &Path) -> Result<String, ProcessError> {
        let _span = tracing::info_span!("processor.docx").entered();

        let file = std::fs::File::open(path).map_err(|e| ProcessError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| ProcessError::DocxProcessing(format!("Failed to open DOCX: {}", e)))?;

        extract_docx_text(path, &mut archive, self.max_xml_bytes)
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Docx)
    }
}

fn extract_docx_text<R: Read + std::io::Seek>(
    path: &Path,
    archive: &mut zip::ZipArchive<R>,
    limit: u64,
) -> Result<String, ProcessError> {
    let mut document_xml = archive
        .by_name("word/document.xml")
        .map_err(|e| ProcessError::DocxProcessing(format!("Failed to find document.xml: {}", e)))?;

    let exhausted = |size: u64| ProcessError::ResourceExhausted {
        path: path.to_path_buf(),
        size,
        limit,
    };
    if document_xml.size() > limit {
        return Err(exhausted(document_xml.size()));
    }

    // The declared size comes from the archive and may understate the data
    let mut xml_content = String::new();
    let read = (&mut document_xml)
        .take(limit.saturating_add(1))
        .read_to_string(&mut xml_content)
        .map_err(|e| ProcessError::DocxProcessing(format!("Failed to read document.xml: {}", e)))?;
    if read as u64 > limit {
        return Err(exhausted(read as u64));
    }

    parse_docx_xml(&xml_content)
}

fn parse_docx_xml(xml: &str) -> Result<String, ProcessError> {
    let mut reader = Reader::from_str(xml);

    let mut text = String::new();
    let mut in_text_element = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_element = true;
                }
            }
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"tab" => text.push('\t'),
                b"br" | b"cr" => text.push('\n'),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_text_element = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_element {
                    let decoded = e.decode().map_err(|err| {
                        ProcessError::DocxProcessing(format!("Invalid text run: {}", err))
                    })?;
                    text.push_str(&decoded);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_text_element {
                    if let Ok(Some(ch)) = e.resolve_char_ref() {
                        text.push(ch);
                    } else if let Ok(name) = e.decode() {
                        if let Some(value) = quick_xml::escape::resolve_predefined_entity(&name) {
                            text.push_str(value);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ProcessError::DocxProcessing(format!(
                    "XML parsing error: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(text)
}
