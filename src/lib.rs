//! relget - release discovery and normalization
//!
//! Fetches a tool's releases from GitHub or Gitea, orders them by semantic
//! version and maps each release's assets onto the platforms they run on.

pub use relget_config as config;
pub use relget_core as core;
pub use relget_provider as provider;
pub use relget_utils as utils;

// Re-export commonly used types for convenience
pub use relget_config::{Settings, ToolDescriptor, ToolRegistry};
pub use relget_core::{
    normalize, pick_latest, select, AssetRef, Channel, Error, NormalizedRelease,
    NormalizedResult, Pipeline, Platform, Result,
};
pub use relget_provider::{GiteaProvider, GitHubProvider, ProviderError, ProviderManager};
pub use relget_utils::versioning::ParsedVersion;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facade_exposes_components() {
        let registry = ToolRegistry::builtin();
        assert!(registry.get("kubectx").is_some());

        let providers = ProviderManager::with_defaults();
        assert!(providers.get_provider("github").is_some());

        let pipeline = Pipeline::new(Settings::default());
        assert_eq!(pipeline.settings().concurrency, 4);
    }
}
