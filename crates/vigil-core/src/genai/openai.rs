//! OpenAI provider using the Chat Completions API.
//!
//! Each thumbnail goes in as a data-URL `image_url` part, followed by the
//! prompt text. Any OpenAI-compatible server works through `genai.base_url`.

use super::provider::{self, GenAiProvider, ImageInput};
use super::registry::{ProviderModule, ProviderRegistry};
use super::GenAiProviderKind;
use crate::config::GenAiConfig;
use crate::error::GenAiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub(crate) const MODULE: ProviderModule = ProviderModule {
    kind: GenAiProviderKind::OpenAi,
    register,
};

fn register(registry: &ProviderRegistry) -> Result<(), GenAiError> {
    registry.register(GenAiProviderKind::OpenAi, create);
    Ok(())
}

fn create(config: &GenAiConfig, timeout: Duration) -> Result<Box<dyn GenAiProvider>, GenAiError> {
    Ok(Box::new(OpenAiProvider::from_config(config, timeout)?))
}

/// OpenAI provider using Chat Completions API.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn from_config(config: &GenAiConfig, timeout: Duration) -> Result<Self, GenAiError> {
        let kind = GenAiProviderKind::OpenAi;
        let api_key = provider::require_api_key(config, kind, "OPENAI_API_KEY")?;
        let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Ok(Self {
            api_key,
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            timeout,
            client: provider::http_client(kind, timeout)?,
        })
    }
}

// --- Request types (shared with Azure OpenAI) ---

#[derive(Serialize)]
pub(super) struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ChatContent>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ChatContent {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'static str>,
}

impl ChatRequest {
    /// One user message: every image in order, then the prompt.
    pub(super) fn describe(
        model: Option<&str>,
        prompt: &str,
        images: &[Vec<u8>],
        detail: Option<&'static str>,
    ) -> Self {
        let mut content: Vec<ChatContent> = images
            .iter()
            .map(|bytes| ChatContent::ImageUrl {
                image_url: ImageUrl {
                    url: ImageInput::from_bytes(bytes).data_url(),
                    detail,
                },
            })
            .collect();
        content.push(ChatContent::Text {
            text: prompt.to_string(),
        });

        Self {
            model: model.map(String::from),
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
        }
    }
}

// --- Response types ---

#[derive(Deserialize)]
pub(super) struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    /// Text of the first choice, if the model produced any.
    pub(super) fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .and_then(|text| provider::non_empty(&text))
    }
}

#[async_trait]
impl GenAiProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn send(&self, prompt: &str, images: &[Vec<u8>]) -> Result<Option<String>, GenAiError> {
        let kind = GenAiProviderKind::OpenAi;
        let body = ChatRequest::describe(Some(self.model.as_str()), prompt, images, None);

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await;
        let resp = provider::check_response(kind, resp).await?;

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| {
            GenAiError::provider(kind, format!("Failed to parse OpenAI response: {e}"))
        })?;

        Ok(chat_resp.into_text())
    }
}
