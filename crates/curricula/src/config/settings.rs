use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

pub const ENV_API_KEY: &str = "CURRICULA_API_KEY";
pub const ENV_MODEL_ID: &str = "CURRICULA_MODEL_ID";
pub const ENV_API_URL: &str = "CURRICULA_API_URL";
pub const ENV_MAX_TOKENS: &str = "CURRICULA_MAX_TOKENS";
pub const ENV_TIMEOUT_SECS: &str = "CURRICULA_TIMEOUT_SECS";

pub const DEFAULT_MODEL_ID: &str = "claude-sonnet-4-5";
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MAX_TOKENS: u32 = 16_000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Connection settings for the generative model.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub api_key: SecretString,
    pub model_id: String,
    pub api_url: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl ModelSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from an arbitrary variable source. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get(ENV_API_KEY).ok_or(ConfigError::MissingEnv { name: ENV_API_KEY })?;

        let max_tokens = match get(ENV_MAX_TOKENS) {
            Some(raw) => parse_positive::<u32>(ENV_MAX_TOKENS, &raw)?,
            None => DEFAULT_MAX_TOKENS,
        };
        let timeout_secs = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => parse_positive::<u64>(ENV_TIMEOUT_SECS, &raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key: SecretString::from(api_key),
            model_id: get(ENV_MODEL_ID).unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            api_url: get(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            max_tokens,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_positive<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let value: T = raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
        name,
        reason: e.to_string(),
    })?;
    if value <= T::default() {
        return Err(ConfigError::InvalidEnv {
            name,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

/// Limits applied while turning source documents into text.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionSettings {
    /// Documents larger than this are refused before decoding.
    pub max_document_bytes: u64,
    pub ocr_dpi: u32,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            max_document_bytes: 100_000_000,
            ocr_dpi: 300,
        }
    }
}
