//! Model-backed stages: standardization and analysis, plus the client and
//! the repair layer that turns model text into records.

pub mod analyzer;
pub mod client;
pub mod prompts;
pub mod record;
pub mod repair;
pub mod standardizer;

pub use analyzer::Analyzer;
pub use client::{GenerativeModel, Message, MessagesClient, Role};
pub use record::{
    AnalysisOutcome, AnalysisRecord, CandidateSummary, DegradedAnalysis, NOT_AVAILABLE,
    UNPARSEABLE_MARKER,
};
pub use repair::repair_analysis_response;
pub use standardizer::Standardizer;
