pub mod artifacts;
pub mod report;

pub use artifacts::{document_stem, ArtifactStore};
pub use report::ResultSink;
