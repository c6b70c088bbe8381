use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Evaluation context injected into the AI prompts. Loaded once per run and
/// shared read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequirements {
    pub output_language: String,
    pub job_description: String,
    pub position: String,
    pub evaluation_criteria: EvaluationCriteria,
    #[serde(default)]
    pub directories: Option<DirectoriesConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationCriterion {
    pub weight: f64,
    pub description: String,
}

/// Named criteria in the order they appear in the requirements file; the
/// prompt renders them in that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationCriteria(IndexMap<String, EvaluationCriterion>);

impl EvaluationCriteria {
    pub fn new(criteria: Vec<(String, EvaluationCriterion)>) -> Self {
        Self(criteria.into_iter().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EvaluationCriterion)> {
        self.0.iter().map(|(name, c)| (name.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.0.values().map(|c| c.weight).sum()
    }
}

/// Directory name overrides, relative to the base directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoriesConfig {
    #[serde(default = "default_input")]
    pub input: String,
    #[serde(default = "default_extracted")]
    pub extracted: String,
    #[serde(default = "default_processed")]
    pub processed: String,
    #[serde(default = "default_analysis")]
    pub analysis: String,
    #[serde(default = "default_report")]
    pub report: String,
    #[serde(default = "default_log")]
    pub log: String,
    #[serde(default = "default_temp")]
    pub temp: String,
}

fn default_input() -> String {
    "input".to_string()
}

fn default_extracted() -> String {
    "extracted".to_string()
}

fn default_processed() -> String {
    "processed".to_string()
}

fn default_analysis() -> String {
    "analysis".to_string()
}

fn default_report() -> String {
    "report".to_string()
}

fn default_log() -> String {
    "log".to_string()
}

fn default_temp() -> String {
    "temp".to_string()
}

impl Default for DirectoriesConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            extracted: default_extracted(),
            processed: default_processed(),
            analysis: default_analysis(),
            report: default_report(),
            log: default_log(),
            temp: default_temp(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Other,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            _ => Self::Other,
        }
    }

    pub fn from_path(path: &std::path::Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Other)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other)
    }
}
