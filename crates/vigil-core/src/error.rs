//! Error types for Vigil.
//!
//! Configuration problems are reported when the file is loaded. GenAI errors
//! are reported per call so one bad event never disables the client.

use thiserror::Error;

use crate::genai::GenAiProviderKind;

/// Top-level error type for Vigil operations.
#[derive(Error, Debug)]
pub enum VigilError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Description generation errors
    #[error("GenAI error: {0}")]
    GenAi(#[from] GenAiError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while registering providers or generating descriptions.
#[derive(Error, Debug)]
pub enum GenAiError {
    /// Event metadata has no `label` key, so no template can be chosen
    #[error("Event metadata is missing the 'label' key")]
    MissingLabel,

    /// The prompt template could not be filled from the event metadata
    #[error("Cannot format prompt template {template:?}: {message}")]
    PromptFormat { template: String, message: String },

    /// A provider call failed
    #[error("{provider} request failed: {message}")]
    Provider {
        provider: GenAiProviderKind,
        message: String,
        status_code: Option<u16>,
    },

    /// A registered provider could not be instantiated from the config
    #[error("Cannot construct {provider} provider: {message}")]
    Construction {
        provider: GenAiProviderKind,
        message: String,
    },

    /// A provider module failed to register itself during discovery
    #[error("Failed to register {provider} provider: {message}")]
    Registration {
        provider: GenAiProviderKind,
        message: String,
    },
}

impl GenAiError {
    /// Shorthand for a provider-side failure without an HTTP status.
    pub(crate) fn provider(provider: GenAiProviderKind, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
            status_code: None,
        }
    }
}

/// Convenience type alias for Vigil results.
pub type Result<T> = std::result::Result<T, VigilError>;

/// Convenience type alias for GenAI-specific results.
pub type GenAiResult<T> = std::result::Result<T, GenAiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_message_names_provider() {
        let err = GenAiError::Provider {
            provider: GenAiProviderKind::Ollama,
            message: "HTTP 500".to_string(),
            status_code: Some(500),
        };
        assert_eq!(err.to_string(), "ollama request failed: HTTP 500");
    }

    #[test]
    fn test_genai_error_converts_to_top_level() {
        let err: VigilError = GenAiError::MissingLabel.into();
        assert!(err.to_string().starts_with("GenAI error:"));
    }
}
