use std::sync::Arc;

use crate::ai::client::{GenerativeModel, Message};
use crate::ai::prompts;
use crate::ai::record::AnalysisOutcome;
use crate::ai::repair::repair_analysis_response;
use crate::config::JobRequirements;
use crate::error::GenerationError;

/// Scores a standardized résumé against the job requirements.
///
/// Only a failed model call is an error. Malformed output comes back as
/// [`AnalysisOutcome::Degraded`].
pub struct Analyzer {
    model: Arc<dyn GenerativeModel>,
    requirements: Arc<JobRequirements>,
}

impl Analyzer {
    pub fn new(model: Arc<dyn GenerativeModel>, requirements: Arc<JobRequirements>) -> Self {
        Self {
            model,
            requirements,
        }
    }

    pub fn analyze(&self, canonical_text: &str) -> Result<AnalysisOutcome, GenerationError> {
        let _span = tracing::info_span!("ai.analyze", chars = canonical_text.len()).entered();

        let system = prompts::analysis_system_prompt(&self.requirements);
        let user = Message::user(prompts::analysis_user_prompt(
            &self.requirements,
            canonical_text,
        ));

        let response = self.model.invoke(&system, std::slice::from_ref(&user))?;
        Ok(repair_analysis_response(response.as_bytes()))
    }
}
