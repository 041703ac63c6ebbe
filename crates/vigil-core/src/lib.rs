//! Vigil Core - generative-AI descriptions for detected objects.
//!
//! Given the thumbnails and metadata of one detection event, Vigil asks a
//! configured generative-AI backend to describe what was seen.
//!
//! # Architecture
//!
//! ```text
//! GenAiConfig → create_client → registry (discover, resolve) → provider factory
//!                                                                  │
//! thumbnails + metadata → GenAiClient::generate_description → prompt → provider.send
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use vigil_core::{create_client, Config, Metadata};
//!
//! #[tokio::main]
//! async fn main() -> vigil_core::Result<()> {
//!     let config = Config::load()?;
//!     let Some(client) = create_client(&config.genai) else {
//!         return Ok(()); // GenAI disabled or misconfigured
//!     };
//!
//!     let mut metadata = Metadata::new();
//!     metadata.insert("label".into(), "car".into());
//!     let thumbnails = vec![std::fs::read("snapshot.jpg")?];
//!
//!     if let Some(text) = client.generate_description(&thumbnails, &metadata).await? {
//!         println!("{text}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod genai;

pub use config::{Config, GenAiConfig, LoggingConfig};
pub use error::{ConfigError, GenAiError, GenAiResult, Result, VigilError};
pub use genai::{
    create_client, create_client_with_timeout, GenAiClient, GenAiProvider, GenAiProviderKind,
    Metadata, ProviderRegistry, DEFAULT_TIMEOUT,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
