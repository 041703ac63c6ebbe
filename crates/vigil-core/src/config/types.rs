//! Sub-configuration structs with their defaults.

use crate::genai::GenAiProviderKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default prompt used when a label has no dedicated template.
pub const DEFAULT_PROMPT: &str = "Describe the {label} in the sequence of images with as much \
                                  detail as possible. Do not describe the background.";

/// Generative-AI description settings.
///
/// Templates are plain strings with `{key}` placeholders that are filled from
/// event metadata at generation time; they are not checked when loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenAiConfig {
    /// Whether description generation is enabled
    pub enabled: bool,

    /// Backend used to generate descriptions
    pub provider: GenAiProviderKind,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: Option<String>,

    /// Override for the provider endpoint
    pub base_url: Option<String>,

    /// Model name
    pub model: String,

    /// Default prompt template
    pub prompt: String,

    /// Per-label prompt templates, keyed by object label
    pub object_prompts: HashMap<String, String>,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: GenAiProviderKind::OpenAi,
            api_key: None,
            base_url: None,
            model: "gpt-4o".to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            object_prompts: HashMap::new(),
        }
    }
}

impl GenAiConfig {
    /// Template for the given label, falling back to the default prompt.
    pub fn prompt_for(&self, label: &str) -> &str {
        self.object_prompts
            .get(label)
            .map_or(self.prompt.as_str(), String::as_str)
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
