pub mod loader;
pub mod schema;
pub mod settings;
pub mod workspace;

pub use loader::{load_job_requirements, load_job_requirements_from_str};
pub use schema::{
    DirectoriesConfig, DocumentFormat, EvaluationCriteria, EvaluationCriterion, JobRequirements,
};
pub use settings::{ExtractionSettings, ModelSettings};
pub use workspace::Workspace;
