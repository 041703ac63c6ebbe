//! The `vigil providers` command.

use vigil_core::genai::{discover_providers, registry};
use vigil_core::{Config, GenAiProviderKind};

/// List every provider identifier and whether it registered.
pub fn execute(config: &Config) -> anyhow::Result<()> {
    let report = discover_providers();
    let registered = registry::global().registered();

    for kind in GenAiProviderKind::ALL {
        let status = if registered.contains(&kind) {
            "available"
        } else if let Some(reason) = report.failure(kind) {
            tracing::debug!("{kind} failed to register: {reason}");
            "failed"
        } else {
            "missing"
        };
        let marker = if config.genai.provider == kind { "*" } else { " " };
        println!("{marker} {:<14} {status}", kind.as_str());
    }

    if !config.genai.enabled {
        println!("\nGenAI is disabled. Set `enabled = true` under [genai] to use it.");
    }
    Ok(())
}
