use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CurriculaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Processing error: {0}")]
    Process(#[from] ProcessError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Missing environment variable '{name}'")]
    MissingEnv { name: &'static str },

    #[error("Invalid value for environment variable '{name}': {reason}")]
    InvalidEnv { name: &'static str, reason: String },
}

/// Failures raised by the document decoders.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to read document '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to process PDF: {0}")]
    PdfProcessing(String),

    #[error("Failed to process DOCX: {0}")]
    DocxProcessing(String),

    #[error("Document '{path}' exceeds the decode limit ({size} > {limit} bytes)")]
    ResourceExhausted { path: PathBuf, size: u64, limit: u64 },
}

/// Internal OCR failures. These never leave the OCR engine: they become an
/// empty result with a diagnostic.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR not implemented for format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to render PDF page: {0}")]
    Render(String),

    #[error("Failed to initialize Tesseract: {0}")]
    Init(String),

    #[error("OCR failed: {0}")]
    Recognition(String),
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed model response envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Model returned no text content")]
    EmptyContent,

    #[error("Model credentials are not configured")]
    MissingCredentials,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to open report '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to append to report '{path}': {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode report row: {0}")]
    Encode(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, CurriculaError>;
