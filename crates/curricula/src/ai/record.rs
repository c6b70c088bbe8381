use serde_json::Value;

/// Placeholder written for every field of an analysis the model botched.
pub const NOT_AVAILABLE: &str = "N/A";

/// Marks a degraded analysis so it cannot be mistaken for a real parse.
pub const UNPARSEABLE_MARKER: &str = "Model did not return valid JSON";

/// The seven machine-readable fields of an analysis (`csvData`).
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSummary {
    /// Always within `0.0..=100.0`.
    pub score: f64,
    pub sentiment: String,
    pub name: String,
    pub email: String,
    pub incomplete_info: String,
    pub education: String,
    pub key_skills: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    /// Markdown report for humans.
    pub report: String,
    pub summary: CandidateSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DegradedAnalysis {
    /// The sanitized model output, kept so no human-readable content is lost.
    pub raw_text: String,
    pub error: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Parsed(AnalysisRecord),
    Degraded(DegradedAnalysis),
}

impl AnalysisOutcome {
    pub fn degraded(raw_text: impl Into<String>) -> Self {
        Self::Degraded(DegradedAnalysis {
            raw_text: raw_text.into(),
            error: UNPARSEABLE_MARKER,
        })
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    /// Text persisted as the analysis artifact.
    pub fn report(&self) -> &str {
        match self {
            Self::Parsed(record) => &record.report,
            Self::Degraded(degraded) => &degraded.raw_text,
        }
    }

    pub fn summary(&self) -> Option<&CandidateSummary> {
        match self {
            Self::Parsed(record) => Some(&record.summary),
            Self::Degraded(_) => None,
        }
    }
}

impl AnalysisRecord {
    /// Accepts `{"report": ..., "csvData": {...}}` with a coercible score.
    /// Returns `None` for anything else.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let csv = object.get("csvData")?.as_object()?;

        let score = coerce_score(csv.get("score")?)?;
        let text = |key: &str| csv.get(key).map(coerce_text).unwrap_or_default();

        Some(Self {
            report: object.get("report").map(coerce_text).unwrap_or_default(),
            summary: CandidateSummary {
                score,
                sentiment: text("sentiment"),
                name: text("name"),
                email: text("email"),
                incomplete_info: text("incomplete_info"),
                education: text("education"),
                key_skills: text("key_skills"),
            },
        })
    }
}

/// A number, or a string holding one, clamped to `[0, 100]`.
fn coerce_score(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !score.is_finite() {
        return None;
    }
    Some(score.clamp(0.0, 100.0))
}

fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(coerce_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Integral scores print without a fractional part (`72`, not `72.0`).
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{}", score)
    }
}
