use std::sync::Arc;

use crate::ai::client::{GenerativeModel, Message};
use crate::ai::prompts;
use crate::config::JobRequirements;
use crate::error::GenerationError;

/// Rewrites raw résumé text into the five-section Markdown layout.
///
/// One round-trip per call. Emptiness of the result is judged by the caller.
pub struct Standardizer {
    model: Arc<dyn GenerativeModel>,
    requirements: Arc<JobRequirements>,
}

impl Standardizer {
    pub fn new(model: Arc<dyn GenerativeModel>, requirements: Arc<JobRequirements>) -> Self {
        Self {
            model,
            requirements,
        }
    }

    pub fn standardize(&self, raw_text: &str) -> Result<String, GenerationError> {
        let _span = tracing::info_span!("ai.standardize", chars = raw_text.len()).entered();

        let system = prompts::standardization_system_prompt();
        let user = Message::user(prompts::standardization_user_prompt(
            &self.requirements.output_language,
            raw_text,
        ));

        self.model.invoke(&system, std::slice::from_ref(&user))
    }
}
