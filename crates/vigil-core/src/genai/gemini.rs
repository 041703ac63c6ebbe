//! Google Gemini provider using the `generateContent` REST endpoint.

use super::provider::{self, GenAiProvider, ImageInput};
use super::registry::{ProviderModule, ProviderRegistry};
use super::GenAiProviderKind;
use crate::config::GenAiConfig;
use crate::error::GenAiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub(crate) const MODULE: ProviderModule = ProviderModule {
    kind: GenAiProviderKind::Gemini,
    register,
};

fn register(registry: &ProviderRegistry) -> Result<(), GenAiError> {
    registry.register(GenAiProviderKind::Gemini, create);
    Ok(())
}

fn create(config: &GenAiConfig, timeout: Duration) -> Result<Box<dyn GenAiProvider>, GenAiError> {
    Ok(Box::new(GeminiProvider::from_config(config, timeout)?))
}

/// Gemini provider.
pub struct GeminiProvider {
    api_key: String,
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn from_config(config: &GenAiConfig, timeout: Duration) -> Result<Self, GenAiError> {
        let kind = GenAiProviderKind::Gemini;
        let api_key = provider::require_api_key(config, kind, "GEMINI_API_KEY")?;
        let base_url = config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Ok(Self {
            api_key,
            endpoint: format!(
                "{}/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                config.model
            ),
            timeout,
            client: provider::http_client(kind, timeout)?,
        })
    }
}

// --- Request types ---

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Image { inline_data: InlineData },
    Text { text: String },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

impl GenerateRequest {
    fn describe(prompt: &str, images: &[Vec<u8>]) -> Self {
        let mut parts: Vec<Part> = images
            .iter()
            .map(|bytes| {
                let image = ImageInput::from_bytes(bytes);
                Part::Image {
                    inline_data: InlineData {
                        mime_type: image.media_type,
                        data: image.data,
                    },
                }
            })
            .collect();
        parts.push(Part::Text {
            text: prompt.to_string(),
        });
        Self {
            contents: vec![Content { parts }],
        }
    }
}

// --- Response types ---

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        provider::non_empty(&text)
    }
}

#[async_trait]
impl GenAiProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn send(&self, prompt: &str, images: &[Vec<u8>]) -> Result<Option<String>, GenAiError> {
        let kind = GenAiProviderKind::Gemini;
        let body = GenerateRequest::describe(prompt, images);

        let resp = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await;
        let resp = provider::check_response(kind, resp).await?;

        let gen_resp: GenerateResponse = resp.json().await.map_err(|e| {
            GenAiError::provider(kind, format!("Failed to parse Gemini response: {e}"))
        })?;

        Ok(gen_resp.into_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_includes_model() {
        let config = GenAiConfig {
            enabled: true,
            provider: GenAiProviderKind::Gemini,
            api_key: Some("key".to_string()),
            model: "gemini-1.5-flash".to_string(),
            ..GenAiConfig::default()
        };
        let provider = GeminiProvider::from_config(&config, Duration::from_secs(5)).unwrap();
        assert_eq!(
            provider.endpoint,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_parts() {
        let body = GenerateRequest::describe("Describe the dog", &[vec![0xFF, 0xD8, 0xFF]]);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{
                    "parts": [
                        {"inline_data": {"mime_type": "image/jpeg", "data": "/9j/"}},
                        {"text": "Describe the dog"}
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_response_joins_parts() {
        let resp: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"parts": [{"text": "A brown dog "}, {"text": "on the porch."}]}
            }]
        }))
        .unwrap();
        assert_eq!(resp.into_text().as_deref(), Some("A brown dog on the porch."));
    }

    #[test]
    fn test_blocked_response_is_none() {
        // Safety-blocked prompts come back without candidates
        let resp: GenerateResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        assert!(resp.into_text().is_none());
    }
}
