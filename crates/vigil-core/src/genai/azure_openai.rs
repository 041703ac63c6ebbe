//! Azure OpenAI provider.
//!
//! `genai.base_url` is the full resource URL as shown in the Azure portal and
//! must carry the `api-version` query parameter. `genai.model` names the
//! deployment. The request body is the OpenAI chat format with low-detail
//! image parts.

use super::openai::{ChatRequest, ChatResponse};
use super::provider::{self, GenAiProvider};
use super::registry::{ProviderModule, ProviderRegistry};
use super::GenAiProviderKind;
use crate::config::GenAiConfig;
use crate::error::GenAiError;
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

pub(crate) const MODULE: ProviderModule = ProviderModule {
    kind: GenAiProviderKind::AzureOpenAi,
    register,
};

fn register(registry: &ProviderRegistry) -> Result<(), GenAiError> {
    registry.register(GenAiProviderKind::AzureOpenAi, create);
    Ok(())
}

fn create(config: &GenAiConfig, timeout: Duration) -> Result<Box<dyn GenAiProvider>, GenAiError> {
    Ok(Box::new(AzureOpenAiProvider::from_config(config, timeout)?))
}

/// Azure-hosted OpenAI deployment.
pub struct AzureOpenAiProvider {
    api_key: String,
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl AzureOpenAiProvider {
    pub fn from_config(config: &GenAiConfig, timeout: Duration) -> Result<Self, GenAiError> {
        let kind = GenAiProviderKind::AzureOpenAi;
        let base_url = config.base_url.as_deref().ok_or_else(|| GenAiError::Construction {
            provider: kind,
            message: "genai.base_url must be set to the Azure resource URL".to_string(),
        })?;
        let endpoint = deployment_endpoint(base_url, &config.model)?;
        let api_key = provider::require_api_key(config, kind, "AZURE_OPENAI_API_KEY")?;
        Ok(Self {
            api_key,
            endpoint,
            timeout,
            client: provider::http_client(kind, timeout)?,
        })
    }
}

/// Build the chat-completions URL for `deployment` from the resource URL.
fn deployment_endpoint(base_url: &str, deployment: &str) -> Result<String, GenAiError> {
    let invalid = |message: String| GenAiError::Construction {
        provider: GenAiProviderKind::AzureOpenAi,
        message,
    };

    let url = Url::parse(base_url).map_err(|e| invalid(format!("invalid base_url: {e}")))?;
    let api_version = url
        .query_pairs()
        .find(|(key, _)| key == "api-version")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| invalid("base_url is missing the api-version query parameter".into()))?;
    let host = url
        .host_str()
        .ok_or_else(|| invalid("base_url has no host".into()))?;
    let authority = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    Ok(format!(
        "{}://{authority}/openai/deployments/{deployment}/chat/completions?api-version={api_version}",
        url.scheme()
    ))
}

#[async_trait]
impl GenAiProvider for AzureOpenAiProvider {
    fn name(&self) -> &str {
        "azure_openai"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn send(&self, prompt: &str, images: &[Vec<u8>]) -> Result<Option<String>, GenAiError> {
        let kind = GenAiProviderKind::AzureOpenAi;
        // The deployment in the URL selects the model
        let body = ChatRequest::describe(None, prompt, images, Some("low"));

        let resp = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await;
        let resp = provider::check_response(kind, resp).await?;

        let chat_resp: ChatResponse = resp.json().await.map_err(|e| {
            GenAiError::provider(kind, format!("Failed to parse Azure OpenAI response: {e}"))
        })?;

        Ok(chat_resp.into_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_endpoint_from_portal_url() {
        let endpoint = deployment_endpoint(
            "https://frontdoor.openai.azure.com/openai/deployments/old/chat/completions?api-version=2024-02-01",
            "gpt-4o",
        )
        .unwrap();
        assert_eq!(
            endpoint,
            "https://frontdoor.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-02-01"
        );
    }

    #[test]
    fn test_deployment_endpoint_keeps_port() {
        let endpoint =
            deployment_endpoint("http://localhost:8080/?api-version=2024-02-01", "vision").unwrap();
        assert!(endpoint.starts_with("http://localhost:8080/openai/deployments/vision/"));
    }

    #[test]
    fn test_deployment_endpoint_requires_api_version() {
        let err = deployment_endpoint("https://frontdoor.openai.azure.com/", "gpt-4o").unwrap_err();
        assert!(err.to_string().contains("api-version"));
    }

    #[test]
    fn test_from_config_requires_base_url() {
        let config = GenAiConfig {
            enabled: true,
            provider: GenAiProviderKind::AzureOpenAi,
            api_key: Some("key".to_string()),
            ..GenAiConfig::default()
        };
        let err = AzureOpenAiProvider::from_config(&config, Duration::from_secs(5))
            .err()
            .unwrap();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_from_config() {
        let config = GenAiConfig {
            enabled: true,
            provider: GenAiProviderKind::AzureOpenAi,
            api_key: Some("key".to_string()),
            base_url: Some("https://res.openai.azure.com/?api-version=2024-02-01".to_string()),
            model: "describer".to_string(),
            ..GenAiConfig::default()
        };
        let provider = AzureOpenAiProvider::from_config(&config, Duration::from_secs(9)).unwrap();
        assert!(provider.endpoint.contains("/deployments/describer/"));
        assert_eq!(provider.timeout(), Duration::from_secs(9));
    }

    #[test]
    fn test_request_uses_low_detail_and_no_model() {
        let body = ChatRequest::describe(None, "Describe", &[vec![0xFF, 0xD8, 0xFF]], Some("low"));
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("model").is_none());
        assert_eq!(value["messages"][0]["content"][0]["image_url"]["detail"], "low");
    }
}
