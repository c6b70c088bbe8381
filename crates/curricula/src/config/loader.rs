use std::path::Path;

use crate::config::schema::JobRequirements;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/job-requirements-v1.json");

pub fn load_job_requirements<P: AsRef<Path>>(path: P) -> Result<JobRequirements, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_job_requirements_from_str(&content)
}

pub fn load_job_requirements_from_str(content: &str) -> Result<JobRequirements, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let requirements: JobRequirements = serde_json::from_value(json_value)?;

    validate_requirements(&requirements)?;

    Ok(requirements)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_requirements(requirements: &JobRequirements) -> Result<(), ConfigError> {
    if requirements.output_language.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "output_language must not be empty".to_string(),
        });
    }

    if requirements.evaluation_criteria.is_empty() {
        return Err(ConfigError::Validation {
            message: "evaluation_criteria must name at least one criterion".to_string(),
        });
    }

    for (name, criterion) in requirements.evaluation_criteria.iter() {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "evaluation criterion names must not be empty".to_string(),
            });
        }
        if !criterion.weight.is_finite() || criterion.weight < 0.0 {
            return Err(ConfigError::Validation {
                message: format!(
                    "criterion '{}' has invalid weight {}",
                    name, criterion.weight
                ),
            });
        }
    }

    if let Some(dirs) = &requirements.directories {
        for name in [
            &dirs.input,
            &dirs.extracted,
            &dirs.processed,
            &dirs.analysis,
            &dirs.report,
            &dirs.log,
            &dirs.temp,
        ] {
            if Path::new(name).is_absolute() || name.split(['/', '\\']).any(|c| c == "..") {
                return Err(ConfigError::Validation {
                    message: format!("directory '{}' must stay inside the base directory", name),
                });
            }
        }
    }

    Ok(())
}
