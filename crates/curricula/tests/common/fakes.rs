//! Scripted stand-ins for the external collaborators.
//!
//! None of them touch the network, Tesseract or poppler.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use curricula::ai::{GenerativeModel, Message};
use curricula::config::DocumentFormat;
use curricula::error::{GenerationError, ProcessError};
use curricula::processor::{DocumentDecoder, OcrEngine, OcrOutput};

/// Decoder answering per file stem. Unknown stems decode to empty text.
#[derive(Default)]
pub struct ScriptedDecoder {
    texts: HashMap<String, String>,
    failures: HashMap<String, String>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, stem: &str, text: &str) -> Self {
        self.texts.insert(stem.to_string(), text.to_string());
        self
    }

    pub fn failure(mut self, stem: &str, message: &str) -> Self {
        self.failures.insert(stem.to_string(), message.to_string());
        self
    }

    /// Shared call counter; stays readable after the decoder moves into a
    /// pipeline.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl DocumentDecoder for ScriptedDecoder {
    fn decode(&self, path: &Path) -> Result<String, ProcessError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        if let Some(message) = self.failures.get(stem) {
            return Err(ProcessError::PdfProcessing(message.clone()));
        }
        Ok(self.texts.get(stem).cloned().unwrap_or_default())
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        format.is_supported()
    }
}

/// OCR engine returning a fixed text and recording which files it saw.
pub struct ScriptedOcr {
    available: bool,
    output: OcrOutput,
    seen: Mutex<Vec<(PathBuf, String)>>,
}

impl ScriptedOcr {
    pub fn returning(text: &str) -> Self {
        Self {
            available: true,
            output: OcrOutput::text(text),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(diagnostic: &str) -> Self {
        Self {
            available: true,
            output: OcrOutput::failed(diagnostic),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            output: OcrOutput::default(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, String)> {
        self.seen.lock().unwrap().clone()
    }
}

impl OcrEngine for ScriptedOcr {
    fn is_available(&self) -> bool {
        self.available
    }

    fn recognize(&self, path: &Path, language_hint: &str) -> OcrOutput {
        self.seen
            .lock()
            .unwrap()
            .push((path.to_path_buf(), language_hint.to_string()));
        self.output.clone()
    }
}

/// One recorded model call.
#[derive(Debug, Clone)]
pub struct ModelCall {
    pub system: String,
    pub user: String,
}

impl ModelCall {
    pub fn is_standardization(&self) -> bool {
        self.system.contains("CV standardization expert")
    }
}

type Responder = Box<dyn Fn(&ModelCall) -> Result<String, GenerationError> + Send + Sync>;

/// Generative model driven by a closure or a queue of canned responses.
pub struct ScriptedModel {
    responder: Responder,
    calls: Mutex<Vec<ModelCall>>,
}

impl ScriptedModel {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&ModelCall) -> Result<String, GenerationError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Standardization echoes a fixed canonical document; analysis returns
    /// `analysis`.
    pub fn with_analysis(analysis: &str) -> Self {
        let analysis = analysis.to_string();
        Self::new(move |call| {
            if call.is_standardization() {
                Ok(CANONICAL_CV.to_string())
            } else {
                Ok(analysis.clone())
            }
        })
    }

    /// Answers calls in order; runs dry with `EmptyContent`.
    pub fn queued(responses: Vec<Result<String, GenerationError>>) -> Self {
        let queue = Mutex::new(VecDeque::from(responses));
        Self::new(move |_| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GenerationError::EmptyContent))
        })
    }

    pub fn calls(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl GenerativeModel for ScriptedModel {
    fn invoke(&self, system_prompt: &str, messages: &[Message]) -> Result<String, GenerationError> {
        let call = ModelCall {
            system: system_prompt.to_string(),
            user: messages
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        };
        let response = (self.responder)(&call);
        self.calls.lock().unwrap().push(call);
        response
    }
}

pub const CANONICAL_CV: &str = "## Personal Information\n- John Doe\n\n\
## Academic Education\n- BSc Computer Science\n\n\
## Professional Experience\n- Backend Engineer\n\n\
## Skills\n- Go\n\n\
## Additional Information\n- None";

/// Analysis JSON as a well-behaved model would return it.
pub fn analysis_json(name: &str, score: u32) -> String {
    format!(
        r###"{{"report": "## Strengths\n- Go", "csvData": {{"score": {}, "sentiment": "Positive", "name": "{}", "email": "john@example.com", "incomplete_info": "", "education": "BSc", "key_skills": ["Go"]}}}}"###,
        score, name
    )
}
