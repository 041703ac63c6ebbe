//! Provider identifiers shared by the config file and the registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Names one supported generative-AI backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GenAiProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "azure_openai")]
    AzureOpenAi,
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "ollama")]
    Ollama,
    #[serde(rename = "anthropic")]
    Anthropic,
}

impl GenAiProviderKind {
    /// Every known identifier, in declaration order.
    pub const ALL: [GenAiProviderKind; 5] = [
        Self::OpenAi,
        Self::AzureOpenAi,
        Self::Gemini,
        Self::Ollama,
        Self::Anthropic,
    ];

    /// The identifier as written in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::AzureOpenAi => "azure_openai",
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
            Self::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for GenAiProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenAiProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown GenAI provider '{s}' (expected one of: {})", known.join(", "))
            })
    }
}
