//! Configuration validation.
//!
//! Only structural values are checked here. Prompt templates are left alone;
//! a bad placeholder surfaces when a description is generated.

use crate::error::ConfigError;

use super::Config;

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];
const LOG_FORMATS: &[&str] = &["pretty", "json"];

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }
        if self.genai.enabled && self.genai.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "genai.model must be set when genai is enabled".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_validate_rejects_unknown_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.format"));
    }

    #[test]
    fn test_validate_rejects_empty_model_when_enabled() {
        let mut config = Config::default();
        config.genai.model = "  ".to_string();
        // Disabled: model is irrelevant
        assert!(config.validate().is_ok());

        config.genai.enabled = true;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("genai.model"));
    }

    #[test]
    fn test_validate_ignores_malformed_templates() {
        let mut config = Config::default();
        config.genai.enabled = true;
        config.genai.prompt = "Describe the {label".to_string();
        assert!(config.validate().is_ok());
    }
}
