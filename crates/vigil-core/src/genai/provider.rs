//! Provider trait and helpers shared by the concrete backends.
//!
//! Defines the interface every GenAI provider implements. The client façade
//! only ever talks to a `Box<dyn GenAiProvider>` built by a registered factory.

use super::GenAiProviderKind;
use crate::config::GenAiConfig;
use crate::error::GenAiError;
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

/// Trait that all GenAI providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn GenAiProvider>` for dynamic dispatch).
#[async_trait]
pub trait GenAiProvider: Send + Sync {
    /// Provider name for logging (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Per-request timeout this provider was constructed with.
    fn timeout(&self) -> Duration;

    /// Check whether the provider is configured and reachable.
    async fn is_available(&self) -> bool;

    /// Submit the prompt and images, returning the generated text.
    ///
    /// `Ok(None)` means the backend answered but produced no description.
    /// Implementations must give up after roughly [`timeout`](Self::timeout).
    async fn send(&self, prompt: &str, images: &[Vec<u8>]) -> Result<Option<String>, GenAiError>;
}

/// Base64-encoded image ready to send to a provider API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: &'static str,
}

impl ImageInput {
    /// Create an `ImageInput` from raw thumbnail bytes.
    ///
    /// The media type is sniffed from the magic bytes; anything unrecognized
    /// is sent as JPEG, which is what detection pipelines produce.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: sniff_media_type(bytes),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

fn sniff_media_type(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "image/jpeg",
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Resolve the API key for a hosted provider.
///
/// Uses `genai.api_key` when set, otherwise the provider's conventional
/// environment variable.
pub(crate) fn require_api_key(
    config: &GenAiConfig,
    provider: GenAiProviderKind,
    env_var: &str,
) -> Result<String, GenAiError> {
    config
        .api_key
        .as_deref()
        .and_then(resolve_env_var)
        .or_else(|| std::env::var(env_var).ok().filter(|v| !v.is_empty()))
        .ok_or_else(|| GenAiError::Construction {
            provider,
            message: format!("API key not set. Set genai.api_key or the {env_var} env var."),
        })
}

/// Build the HTTP client a provider uses for its whole lifetime.
pub(crate) fn http_client(
    provider: GenAiProviderKind,
    timeout: Duration,
) -> Result<reqwest::Client, GenAiError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GenAiError::Construction {
            provider,
            message: format!("failed to build HTTP client: {e}"),
        })
}

/// Map transport errors and non-2xx responses to [`GenAiError::Provider`].
pub(crate) async fn check_response(
    provider: GenAiProviderKind,
    result: Result<reqwest::Response, reqwest::Error>,
) -> Result<reqwest::Response, GenAiError> {
    let resp = result.map_err(|e| GenAiError::provider(provider, e.to_string()))?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    Err(GenAiError::Provider {
        provider,
        message: format!("HTTP {status}: {text}"),
        status_code: Some(status.as_u16()),
    })
}

/// Trim provider output, treating blank text as no description.
pub(crate) fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
