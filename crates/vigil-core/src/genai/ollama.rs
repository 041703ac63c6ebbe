//! Ollama provider for local vision model inference.
//!
//! Talks to an Ollama instance via its HTTP API.
//! No authentication required, just needs Ollama running and the model pulled.

use super::provider::{self, GenAiProvider, ImageInput};
use super::registry::{ProviderModule, ProviderRegistry};
use super::GenAiProviderKind;
use crate::config::GenAiConfig;
use crate::error::GenAiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

pub(crate) const MODULE: ProviderModule = ProviderModule {
    kind: GenAiProviderKind::Ollama,
    register,
};

fn register(registry: &ProviderRegistry) -> Result<(), GenAiError> {
    registry.register(GenAiProviderKind::Ollama, create);
    Ok(())
}

fn create(config: &GenAiConfig, timeout: Duration) -> Result<Box<dyn GenAiProvider>, GenAiError> {
    Ok(Box::new(OllamaProvider::from_config(config, timeout)?))
}

/// Ollama provider for local vision model inference.
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn from_config(config: &GenAiConfig, timeout: Duration) -> Result<Self, GenAiError> {
        let endpoint = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout,
            client: provider::http_client(GenAiProviderKind::Ollama, timeout)?,
        })
    }
}

/// Ollama /api/generate request body.
#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: Vec<String>,
    stream: bool,
}

/// Ollama /api/generate response.
#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

/// Ollama /api/show request body.
#[derive(Serialize)]
struct ShowRequest<'a> {
    model: &'a str,
}

#[async_trait]
impl GenAiProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    /// True when the server answers and has the configured model.
    async fn is_available(&self) -> bool {
        let url = format!("{}/api/show", self.endpoint);
        let body = ShowRequest { model: &self.model };
        match self
            .client
            .post(&url)
            .json(&body)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!("Ollama not reachable at {}: {e}", self.endpoint);
                false
            }
        }
    }

    async fn send(&self, prompt: &str, images: &[Vec<u8>]) -> Result<Option<String>, GenAiError> {
        let kind = GenAiProviderKind::Ollama;
        let url = format!("{}/api/generate", self.endpoint);

        let body = OllamaRequest {
            model: &self.model,
            prompt,
            images: images
                .iter()
                .map(|bytes| ImageInput::from_bytes(bytes).data)
                .collect(),
            stream: false,
        };

        let resp = self.client.post(&url).json(&body).send().await;
        let resp = provider::check_response(kind, resp).await?;

        let ollama_resp: OllamaResponse = resp.json().await.map_err(|e| {
            GenAiError::provider(kind, format!("Failed to parse Ollama response: {e}"))
        })?;

        Ok(provider::non_empty(&ollama_resp.response))
    }
}
