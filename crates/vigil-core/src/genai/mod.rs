//! Generative-AI descriptions for detected objects.
//!
//! A [`GenAiClient`] turns event thumbnails and metadata into a text
//! description using whichever backend the `[genai]` config names. Backends
//! register factories in a [`ProviderRegistry`]; the client looks them up by
//! [`GenAiProviderKind`] and never depends on a concrete provider.

pub(crate) mod anthropic;
pub(crate) mod azure_openai;
pub mod client;
pub(crate) mod gemini;
pub mod kind;
pub(crate) mod ollama;
pub(crate) mod openai;
pub mod prompt;
pub mod provider;
pub mod registry;

pub use client::{create_client, create_client_with_timeout, GenAiClient, DEFAULT_TIMEOUT};
pub use kind::GenAiProviderKind;
pub use prompt::{format_template, Metadata};
pub use provider::{GenAiProvider, ImageInput};
pub use registry::{
    discover_providers, DiscoveryReport, ProviderFactory, ProviderModule, ProviderRegistry,
};
