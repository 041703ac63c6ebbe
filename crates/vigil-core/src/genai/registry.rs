//! Provider registry and discovery.
//!
//! Providers are not known to the client façade at compile time. Each
//! provider module exposes a [`ProviderModule`] whose `register` function
//! inserts a factory under the module's [`GenAiProviderKind`]. Discovery walks
//! the fixed list of modules linked into the binary and runs every
//! registration once.
//!
//! ```text
//! create_client(config)
//!        │
//!        ▼
//!  registry.discover() ── once ──► openai::MODULE.register(&registry)
//!        │                         azure_openai::MODULE.register(&registry)
//!        │                         ...
//!        ▼
//!  registry.resolve(config.provider) ──► factory(config, timeout) ──► Box<dyn GenAiProvider>
//! ```
//!
//! Registering the same identifier twice replaces the earlier factory.

use super::provider::GenAiProvider;
use super::{anthropic, azure_openai, gemini, ollama, openai, GenAiProviderKind};
use crate::config::GenAiConfig;
use crate::error::GenAiError;
use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};
use std::time::Duration;

/// Builds a provider instance from the GenAI config and request timeout.
pub type ProviderFactory =
    fn(&GenAiConfig, Duration) -> Result<Box<dyn GenAiProvider>, GenAiError>;

/// A provider implementation unit linked into the binary.
#[derive(Clone, Copy)]
pub struct ProviderModule {
    /// Identifier the module registers under
    pub kind: GenAiProviderKind,
    /// Registration hook run once during discovery
    pub register: fn(&ProviderRegistry) -> Result<(), GenAiError>,
}

impl std::fmt::Debug for ProviderModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderModule")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Provider modules shipped with this crate.
pub const BUILTIN_MODULES: &[ProviderModule] = &[
    openai::MODULE,
    azure_openai::MODULE,
    gemini::MODULE,
    ollama::MODULE,
    anthropic::MODULE,
];

/// Outcome of running every module's registration hook.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Modules whose registration succeeded, in discovery order
    pub loaded: Vec<GenAiProviderKind>,
    /// Modules whose registration failed, with the error message
    pub failed: Vec<(GenAiProviderKind, String)>,
}

impl DiscoveryReport {
    /// The load failure recorded for `kind`, if any.
    pub fn failure(&self, kind: GenAiProviderKind) -> Option<&str> {
        self.failed
            .iter()
            .rev()
            .find(|(k, _)| *k == kind)
            .map(|(_, msg)| msg.as_str())
    }
}

/// Table mapping provider identifiers to provider factories.
pub struct ProviderRegistry {
    providers: RwLock<HashMap<GenAiProviderKind, ProviderFactory>>,
    modules: &'static [ProviderModule],
    discovery: OnceLock<DiscoveryReport>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    /// Create an empty registry that discovers the built-in modules.
    pub fn new() -> Self {
        Self::with_modules(BUILTIN_MODULES)
    }

    /// Create an empty registry that discovers the given modules instead.
    pub fn with_modules(modules: &'static [ProviderModule]) -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
            modules,
            discovery: OnceLock::new(),
        }
    }

    /// Register `factory` under `kind`, replacing any earlier registration.
    pub fn register(&self, kind: GenAiProviderKind, factory: ProviderFactory) {
        // The map only holds fn pointers, so a poisoned lock is still consistent.
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if providers.insert(kind, factory).is_some() {
            tracing::debug!("Replacing registered GenAI provider '{kind}'");
        } else {
            tracing::debug!("Registered GenAI provider '{kind}'");
        }
    }

    /// Look up the factory registered under `kind`.
    pub fn resolve(&self, kind: GenAiProviderKind) -> Option<ProviderFactory> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .copied()
    }

    /// Run every module's registration hook, once per registry.
    ///
    /// A module that fails to register is logged and skipped so the remaining
    /// providers stay available. Later calls return the first report.
    pub fn discover(&self) -> &DiscoveryReport {
        self.discovery.get_or_init(|| {
            let mut report = DiscoveryReport::default();
            for module in self.modules {
                match (module.register)(self) {
                    Ok(()) => report.loaded.push(module.kind),
                    Err(e) => {
                        tracing::warn!("Skipping GenAI provider '{}': {e}", module.kind);
                        report.failed.push((module.kind, e.to_string()));
                    }
                }
            }
            tracing::debug!(
                "GenAI provider discovery finished: {} loaded, {} failed",
                report.loaded.len(),
                report.failed.len()
            );
            report
        })
    }

    /// Whether [`discover`](Self::discover) has already run.
    pub fn is_discovered(&self) -> bool {
        self.discovery.get().is_some()
    }

    /// The discovery report, if discovery has run.
    pub fn discovery_report(&self) -> Option<&DiscoveryReport> {
        self.discovery.get()
    }

    /// Identifiers that currently resolve, sorted.
    pub fn registered(&self) -> Vec<GenAiProviderKind> {
        let mut kinds: Vec<_> = self
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        kinds.sort();
        kinds
    }
}

/// The process-wide registry used by [`create_client`](super::create_client).
pub fn global() -> &'static ProviderRegistry {
    static GLOBAL: OnceLock<ProviderRegistry> = OnceLock::new();
    GLOBAL.get_or_init(ProviderRegistry::new)
}

/// Register a factory in the process-wide registry.
pub fn register(kind: GenAiProviderKind, factory: ProviderFactory) {
    global().register(kind, factory);
}

/// Discover the built-in providers into the process-wide registry.
pub fn discover_providers() -> &'static DiscoveryReport {
    global().discover()
}

/// Look up a factory in the process-wide registry.
pub fn resolve(kind: GenAiProviderKind) -> Option<ProviderFactory> {
    global().resolve(kind)
}
