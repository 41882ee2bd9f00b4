//! Settings validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: SyncConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use crate::config::schema::SyncConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted settings field, e.g. `watch.extension`.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check settings beyond what deserialization enforces.
pub fn validate_config(config: &SyncConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError {
            field: "observability.log_level",
            message: format!(
                "unknown level `{}` (expected one of {})",
                config.observability.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let extension = &config.watch.extension;
    if extension.is_empty() {
        errors.push(ValidationError {
            field: "watch.extension",
            message: "must not be empty".to_string(),
        });
    } else if extension.contains(['.', '/', '\\']) {
        errors.push(ValidationError {
            field: "watch.extension",
            message: format!("`{}` must not contain dots or path separators", extension),
        });
    }

    if config.registry.persist && config.registry.state_file.as_os_str().is_empty() {
        errors.push(ValidationError {
            field: "registry.state_file",
            message: "must be set when persistence is enabled".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&SyncConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_problem() {
        let mut config = SyncConfig::default();
        config.observability.log_level = "loud".to_string();
        config.watch.extension = ".json".to_string();
        config.registry.state_file = PathBuf::new();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["observability.log_level", "watch.extension", "registry.state_file"]
        );
    }

    #[test]
    fn test_level_is_case_insensitive() {
        let mut config = SyncConfig::default();
        config.observability.log_level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_state_file_allowed_without_persistence() {
        let mut config = SyncConfig::default();
        config.registry.persist = false;
        config.registry.state_file = PathBuf::new();
        assert!(validate_config(&config).is_ok());
    }
}
