//! The GenAI client façade.
//!
//! Callers never pick a provider themselves: they hand over the `[genai]`
//! config and get back a [`GenAiClient`] (or nothing, when GenAI is disabled
//! or misconfigured). Every description request goes through
//! [`GenAiClient::generate_description`].

use super::prompt::{format_template, Metadata};
use super::provider::GenAiProvider;
use super::registry::{self, ProviderRegistry};
use crate::config::GenAiConfig;
use crate::error::GenAiError;
use std::time::Duration;

/// Request timeout handed to providers when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Generates object descriptions through the configured provider.
pub struct GenAiClient {
    config: GenAiConfig,
    timeout: Duration,
    provider: Box<dyn GenAiProvider>,
}

impl std::fmt::Debug for GenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAiClient")
            .field("provider", &self.provider.name())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl GenAiClient {
    /// Build a client from `config` using the given registry.
    ///
    /// Returns `None` without touching the registry when GenAI is disabled.
    /// An unknown provider or one that cannot be constructed also yields
    /// `None` (with a warning) so the rest of the system keeps running.
    pub fn create(
        registry: &ProviderRegistry,
        config: &GenAiConfig,
        timeout: Duration,
    ) -> Option<Self> {
        if !config.enabled {
            return None;
        }

        let report = registry.discover();
        let Some(factory) = registry.resolve(config.provider) else {
            match report.failure(config.provider) {
                Some(reason) => tracing::warn!(
                    "GenAI provider '{}' failed to load: {reason}",
                    config.provider
                ),
                None => tracing::warn!("GenAI provider '{}' is not registered", config.provider),
            }
            return None;
        };

        match factory(config, timeout) {
            Ok(provider) => {
                tracing::debug!(
                    "GenAI client ready: provider={}, model={}, timeout={timeout:?}",
                    provider.name(),
                    config.model
                );
                Some(Self {
                    config: config.clone(),
                    timeout,
                    provider,
                })
            }
            Err(e) => {
                tracing::warn!("GenAI disabled: {e}");
                None
            }
        }
    }

    /// Generate a description of the detected object in `thumbnails`.
    ///
    /// The template is `object_prompts[label]` or the default prompt, filled
    /// from `metadata`. The provider's text is returned verbatim; `Ok(None)`
    /// means the provider produced nothing.
    pub async fn generate_description(
        &self,
        thumbnails: &[Vec<u8>],
        metadata: &Metadata,
    ) -> Result<Option<String>, GenAiError> {
        let label = metadata.get("label").ok_or(GenAiError::MissingLabel)?;
        let template = match label.as_str() {
            Some(label) => self.config.prompt_for(label),
            None => self.config.prompt.as_str(),
        };
        let prompt = format_template(template, metadata)?;

        tracing::debug!(
            "Requesting {} description for {label} ({} thumbnails)",
            self.provider.name(),
            thumbnails.len()
        );
        self.provider.send(&prompt, thumbnails).await
    }

    /// The config this client was built from.
    pub fn config(&self) -> &GenAiConfig {
        &self.config
    }

    /// Request timeout passed to the provider.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Name of the provider serving this client.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Check whether the provider is configured and reachable.
    pub async fn is_available(&self) -> bool {
        self.provider.is_available().await
    }
}

/// Build a client from `config` using the process-wide registry.
pub fn create_client(config: &GenAiConfig) -> Option<GenAiClient> {
    create_client_with_timeout(config, DEFAULT_TIMEOUT)
}

/// Like [`create_client`], with an explicit provider timeout.
pub fn create_client_with_timeout(config: &GenAiConfig, timeout: Duration) -> Option<GenAiClient> {
    GenAiClient::create(registry::global(), config, timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai::{GenAiProviderKind, ProviderFactory};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Spy provider that records prompts and echoes how it was built.
    struct SpyProvider {
        model: String,
        timeout: Duration,
        reply: Reply,
        prompts: Mutex<Vec<(String, usize)>>,
    }

    #[derive(Clone, Copy)]
    enum Reply {
        Echo,
        Nothing,
        Fail,
    }

    impl SpyProvider {
        fn new(config: &GenAiConfig, timeout: Duration, reply: Reply) -> Box<dyn GenAiProvider> {
            Box::new(Self {
                model: config.model.clone(),
                timeout,
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl GenAiProvider for SpyProvider {
        fn name(&self) -> &str {
            "spy"
        }

        fn timeout(&self) -> Duration {
            self.timeout
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn send(&self, prompt: &str, images: &[Vec<u8>]) -> Result<Option<String>, GenAiError> {
            let calls = {
                let mut prompts = self.prompts.lock().unwrap();
                prompts.push((prompt.to_string(), images.len()));
                prompts.len()
            };
            match self.reply {
                Reply::Echo => Ok(Some(format!(
                    "{}|{}s|{}|{}|call {calls}",
                    self.model,
                    self.timeout.as_secs(),
                    images.len(),
                    prompt
                ))),
                Reply::Nothing => Ok(None),
                Reply::Fail if calls == 1 => Err(GenAiError::Provider {
                    provider: GenAiProviderKind::OpenAi,
                    message: "HTTP 503: overloaded".to_string(),
                    status_code: Some(503),
                }),
                Reply::Fail => Ok(Some(format!("recovered: {prompt}"))),
            }
        }
    }

    fn echo(config: &GenAiConfig, timeout: Duration) -> Result<Box<dyn GenAiProvider>, GenAiError> {
        Ok(SpyProvider::new(config, timeout, Reply::Echo))
    }

    fn nothing(config: &GenAiConfig, timeout: Duration) -> Result<Box<dyn GenAiProvider>, GenAiError> {
        Ok(SpyProvider::new(config, timeout, Reply::Nothing))
    }

    fn fail_once(config: &GenAiConfig, timeout: Duration) -> Result<Box<dyn GenAiProvider>, GenAiError> {
        Ok(SpyProvider::new(config, timeout, Reply::Fail))
    }

    fn broken(_: &GenAiConfig, _: Duration) -> Result<Box<dyn GenAiProvider>, GenAiError> {
        Err(GenAiError::Construction {
            provider: GenAiProviderKind::OpenAi,
            message: "API key not set".to_string(),
        })
    }

    static DISABLED_BUILDS: AtomicUsize = AtomicUsize::new(0);

    fn counting(config: &GenAiConfig, timeout: Duration) -> Result<Box<dyn GenAiProvider>, GenAiError> {
        DISABLED_BUILDS.fetch_add(1, Ordering::SeqCst);
        echo(config, timeout)
    }

    fn enabled_config() -> GenAiConfig {
        let mut config = GenAiConfig {
            enabled: true,
            provider: GenAiProviderKind::OpenAi,
            model: "spy-model".to_string(),
            prompt: "Describe the {label}".to_string(),
            ..GenAiConfig::default()
        };
        config
            .object_prompts
            .insert("car".to_string(), "Describe the {color} car".to_string());
        config
    }

    fn registry_with(factory: ProviderFactory) -> ProviderRegistry {
        let registry = ProviderRegistry::with_modules(&[]);
        registry.register(GenAiProviderKind::OpenAi, factory);
        registry
    }

    fn client_with(factory: ProviderFactory) -> GenAiClient {
        GenAiClient::create(&registry_with(factory), &enabled_config(), DEFAULT_TIMEOUT).unwrap()
    }

    fn metadata(value: serde_json::Value) -> Metadata {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("metadata must be an object"),
        }
    }

    fn thumbnails() -> Vec<Vec<u8>> {
        vec![vec![0xFF, 0xD8, 0xFF], vec![0xFF, 0xD8, 0xFF]]
    }

    #[test]
    fn test_disabled_config_has_no_side_effects() {
        let registry = registry_with(counting);
        let config = GenAiConfig {
            enabled: false,
            ..enabled_config()
        };

        assert!(GenAiClient::create(&registry, &config, DEFAULT_TIMEOUT).is_none());
        assert!(!registry.is_discovered());
        assert_eq!(DISABLED_BUILDS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_disabled_config_with_global_registry() {
        assert!(create_client(&GenAiConfig::default()).is_none());
    }

    #[test]
    fn test_unregistered_provider_returns_none() {
        let registry = registry_with(echo);
        let config = GenAiConfig {
            provider: GenAiProviderKind::Gemini,
            ..enabled_config()
        };
        assert!(GenAiClient::create(&registry, &config, DEFAULT_TIMEOUT).is_none());
        assert!(registry.is_discovered());
    }

    #[test]
    fn test_construction_failure_returns_none() {
        let registry = registry_with(broken);
        assert!(GenAiClient::create(&registry, &enabled_config(), DEFAULT_TIMEOUT).is_none());
    }

    #[test]
    fn test_hosted_provider_without_key_degrades() {
        let config = GenAiConfig {
            provider: GenAiProviderKind::AzureOpenAi,
            base_url: None,
            ..enabled_config()
        };
        assert!(GenAiClient::create(&ProviderRegistry::new(), &config, DEFAULT_TIMEOUT).is_none());
    }

    #[tokio::test]
    async fn test_provider_built_with_config_and_timeout() {
        let registry = registry_with(echo);
        let timeout = Duration::from_secs(17);
        let client = GenAiClient::create(&registry, &enabled_config(), timeout).unwrap();

        assert_eq!(client.timeout(), timeout);
        assert_eq!(client.provider_name(), "spy");
        assert_eq!(client.config().model, "spy-model");

        let text = client
            .generate_description(&thumbnails(), &metadata(json!({"label": "dog"})))
            .await
            .unwrap();
        assert_eq!(
            text.as_deref(),
            Some("spy-model|17s|2|Describe the dog|call 1")
        );
    }

    #[tokio::test]
    async fn test_object_prompt_is_formatted() {
        let client = client_with(echo);
        let text = client
            .generate_description(
                &thumbnails(),
                &metadata(json!({"label": "car", "color": "red"})),
            )
            .await
            .unwrap()
            .unwrap();
        assert!(text.ends_with("|Describe the red car|call 1"));
    }

    #[tokio::test]
    async fn test_default_prompt_for_unlisted_label() {
        let client = client_with(echo);
        let text = client
            .generate_description(&thumbnails(), &metadata(json!({"label": "person"})))
            .await
            .unwrap()
            .unwrap();
        assert!(text.ends_with("|Describe the person|call 1"));
    }

    #[tokio::test]
    async fn test_unknown_placeholder_is_error() {
        let mut config = enabled_config();
        config.prompt = "Describe the {unknown_field}".to_string();
        let client = GenAiClient::create(&registry_with(echo), &config, DEFAULT_TIMEOUT).unwrap();

        let err = client
            .generate_description(&thumbnails(), &metadata(json!({"label": "person"})))
            .await
            .unwrap_err();
        assert!(matches!(err, GenAiError::PromptFormat { .. }));

        // The client still works for well-formed requests
        let text = client
            .generate_description(&thumbnails(), &metadata(json!({"label": "car", "color": "blue"})))
            .await
            .unwrap()
            .unwrap();
        assert!(text.contains("Describe the blue car"));
    }

    #[tokio::test]
    async fn test_missing_label_is_error() {
        let client = client_with(echo);
        let err = client
            .generate_description(&thumbnails(), &metadata(json!({"color": "red"})))
            .await
            .unwrap_err();
        assert!(matches!(err, GenAiError::MissingLabel));
    }

    #[tokio::test]
    async fn test_provider_without_result_returns_none() {
        let client = client_with(nothing);
        let text = client
            .generate_description(&thumbnails(), &metadata(json!({"label": "car", "color": "red"})))
            .await
            .unwrap();
        assert!(text.is_none());
    }

    #[tokio::test]
    async fn test_provider_failure_does_not_poison_client() {
        let client = client_with(fail_once);
        let meta = metadata(json!({"label": "person"}));

        let err = client.generate_description(&thumbnails(), &meta).await.unwrap_err();
        assert!(matches!(
            err,
            GenAiError::Provider {
                status_code: Some(503),
                ..
            }
        ));

        let text = client.generate_description(&thumbnails(), &meta).await.unwrap();
        assert_eq!(text.as_deref(), Some("recovered: Describe the person"));
    }

    #[tokio::test]
    async fn test_thumbnails_passed_through() {
        let client = client_with(echo);
        let many = vec![vec![1u8]; 5];
        let text = client
            .generate_description(&many, &metadata(json!({"label": "cat"})))
            .await
            .unwrap()
            .unwrap();
        assert!(text.starts_with("spy-model|60s|5|"));
    }
}
