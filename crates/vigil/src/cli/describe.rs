//! The `vigil describe` command: one description for one detection event.

use anyhow::Context;
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use vigil_core::{create_client_with_timeout, Config, GenAiProviderKind, Metadata};

/// Arguments for the `describe` command.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Thumbnail images of the detected object, in order
    #[arg(required = true)]
    pub thumbnails: Vec<PathBuf>,

    /// Object label (selects the prompt template)
    #[arg(short, long)]
    pub label: String,

    /// Extra metadata for the prompt template, as KEY=VALUE (repeatable)
    #[arg(short, long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta)]
    pub meta: Vec<(String, Value)>,

    /// Provider to use instead of the configured one
    #[arg(short, long)]
    pub provider: Option<GenAiProviderKind>,

    /// Model to use instead of the configured one
    #[arg(long)]
    pub model: Option<String>,

    /// Provider request timeout in seconds
    #[arg(short, long, default_value = "60")]
    pub timeout: u64,

    /// Print the result as a JSON object
    #[arg(long)]
    pub json: bool,
}

/// Parse a `KEY=VALUE` pair. Values that parse as JSON keep their type.
fn parse_meta(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Assemble event metadata; `--label` always wins over a `label=` pair.
fn build_metadata(label: &str, meta: Vec<(String, Value)>) -> Metadata {
    let mut metadata: Metadata = meta.into_iter().collect();
    metadata.insert("label".to_string(), Value::String(label.to_string()));
    metadata
}

/// Execute the describe command.
pub async fn execute(args: DescribeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(provider) = args.provider {
        config.genai.provider = provider;
    }
    if let Some(model) = args.model {
        config.genai.model = model;
    }
    if !config.genai.enabled {
        anyhow::bail!(
            "GenAI is disabled.\n\n  Hint: Set `enabled = true` under [genai] in {}",
            Config::default_path().display()
        );
    }

    let client = create_client_with_timeout(&config.genai, Duration::from_secs(args.timeout))
        .with_context(|| {
            format!(
                "GenAI provider '{}' is not usable. Run with --verbose for details.",
                config.genai.provider
            )
        })?;

    let mut thumbnails = Vec::with_capacity(args.thumbnails.len());
    for path in &args.thumbnails {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
        let bytes = tokio::fs::read(&expanded)
            .await
            .with_context(|| format!("Failed to read thumbnail {}", expanded.display()))?;
        thumbnails.push(bytes);
    }

    let metadata = build_metadata(&args.label, args.meta);
    let description = client.generate_description(&thumbnails, &metadata).await?;

    if args.json {
        let output = serde_json::json!({
            "provider": client.provider_name(),
            "label": args.label,
            "description": description,
        });
        println!("{output}");
    } else {
        match description {
            Some(text) => println!("{text}"),
            None => tracing::warn!("{} returned no description", client.provider_name()),
        }
    }

    Ok(())
}
