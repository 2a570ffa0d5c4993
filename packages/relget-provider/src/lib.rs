pub mod base_provider;
pub mod data;
pub mod error;
pub mod providers;
pub mod wire;

// Re-export common types
pub use base_provider::{FetchOptions, ReleaseProvider, MAX_PAGE_SIZE, USER_AGENT};
pub use data::{RawAsset, RawRelease};
pub use error::{ProviderError, Result};
pub use providers::{GiteaProvider, GitHubProvider};
pub use wire::ReleasePage;

use std::collections::BTreeMap;

/// Release providers by friendly name.
pub struct ProviderManager {
    providers: BTreeMap<String, Box<dyn ReleaseProvider>>,
}

impl Default for ProviderManager {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ProviderManager {
    pub fn new() -> Self {
        Self {
            providers: BTreeMap::new(),
        }
    }

    /// GitHub and Codeberg-hosted Gitea with their public API endpoints.
    pub fn with_defaults() -> Self {
        let mut manager = Self::new();
        manager.register_provider(Box::new(GitHubProvider::new()));
        manager.register_provider(Box::new(GiteaProvider::new()));
        manager
    }

    /// Register a provider, replacing any previous one with the same name.
    pub fn register_provider(&mut self, provider: Box<dyn ReleaseProvider>) {
        self.providers
            .insert(provider.get_friendly_name().to_string(), provider);
    }

    pub fn get_provider(&self, name: &str) -> Option<&dyn ReleaseProvider> {
        self.providers.get(name).map(|p| p.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(|k| k.as_str())
    }
}
