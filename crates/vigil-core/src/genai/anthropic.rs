//! Anthropic provider using the Messages API.
//!
//! Sends every thumbnail as a base64 image content block, then the prompt.

use super::provider::{self, GenAiProvider, ImageInput};
use super::registry::{ProviderModule, ProviderRegistry};
use super::GenAiProviderKind;
use crate::config::GenAiConfig;
use crate::error::GenAiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

pub(crate) const MODULE: ProviderModule = ProviderModule {
    kind: GenAiProviderKind::Anthropic,
    register,
};

fn register(registry: &ProviderRegistry) -> Result<(), GenAiError> {
    registry.register(GenAiProviderKind::Anthropic, create);
    Ok(())
}

fn create(config: &GenAiConfig, timeout: Duration) -> Result<Box<dyn GenAiProvider>, GenAiError> {
    Ok(Box::new(AnthropicProvider::from_config(config, timeout)?))
}

/// Anthropic provider using the Messages API.
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn from_config(config: &GenAiConfig, timeout: Duration) -> Result<Self, GenAiError> {
        let kind = GenAiProviderKind::Anthropic;
        let api_key = provider::require_api_key(config, kind, "ANTHROPIC_API_KEY")?;
        let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Ok(Self {
            api_key,
            model: config.model.clone(),
            endpoint: format!("{}/messages", base_url.trim_end_matches('/')),
            timeout,
            client: provider::http_client(kind, timeout)?,
        })
    }
}

// --- Request types ---

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: Vec<ContentBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "image")]
    Image { source: ImageSource },
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'static str,
    data: String,
}

impl<'a> MessagesRequest<'a> {
    fn describe(model: &'a str, prompt: &str, images: &[Vec<u8>]) -> Self {
        let mut content: Vec<ContentBlock> = images
            .iter()
            .map(|bytes| {
                let image = ImageInput::from_bytes(bytes);
                ContentBlock::Image {
                    source: ImageSource {
                        source_type: "base64",
                        media_type: image.media_type,
                        data: image.data,
                    },
                }
            })
            .collect();
        content.push(ContentBlock::Text {
            text: prompt.to_string(),
        });

        Self {
            model,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content,
            }],
        }
    }
}

// --- Response types ---

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    text: Option<String>,
}

impl MessagesResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self.content.into_iter().filter_map(|c| c.text).collect();
        provider::non_empty(&text)
    }
}

#[async_trait]
impl GenAiProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn send(&self, prompt: &str, images: &[Vec<u8>]) -> Result<Option<String>, GenAiError> {
        let kind = GenAiProviderKind::Anthropic;
        let body = MessagesRequest::describe(&self.model, prompt, images);

        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await;
        let resp = provider::check_response(kind, resp).await?;

        let messages_resp: MessagesResponse = resp.json().await.map_err(|e| {
            GenAiError::provider(kind, format!("Failed to parse Anthropic response: {e}"))
        })?;

        Ok(messages_resp.into_text())
    }
}
