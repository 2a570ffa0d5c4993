use tracing::debug;

use relget_config::ToolDescriptor;
use relget_provider::{FetchOptions, RawRelease, ReleaseProvider, Result};

/// A tool's releases in provider order, stamped with its display names.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolFeed {
    pub tool_names: Vec<String>,
    pub releases: Vec<RawRelease>,
}

/// Binds a tool descriptor to the provider that hosts it.
pub struct ToolAdapter<'a> {
    tool: &'a ToolDescriptor,
    provider: &'a dyn ReleaseProvider,
}

impl<'a> ToolAdapter<'a> {
    pub fn new(tool: &'a ToolDescriptor, provider: &'a dyn ReleaseProvider) -> Self {
        Self { tool, provider }
    }

    pub fn tool(&self) -> &ToolDescriptor {
        self.tool
    }

    /// Fetch the tool's releases; provider errors are returned unchanged.
    pub async fn fetch(&self, options: &FetchOptions) -> Result<ToolFeed> {
        debug!(
            tool = %self.tool.name,
            provider = self.provider.get_friendly_name(),
            owner = %self.tool.owner,
            repo = %self.tool.repo,
            "fetching tool feed"
        );
        let releases = self
            .provider
            .fetch_releases(&self.tool.owner, &self.tool.repo, options)
            .await?;
        Ok(ToolFeed {
            tool_names: self.tool.names(),
            releases,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use relget_provider::ProviderError;
    use std::sync::Mutex;

    struct FakeProvider {
        outcome: Result<Vec<RawRelease>>,
        calls: Mutex<Vec<(String, String, Option<usize>)>>,
    }

    impl FakeProvider {
        fn new(outcome: Result<Vec<RawRelease>>) -> Self {
            Self {
                outcome,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ReleaseProvider for FakeProvider {
        fn get_friendly_name(&self) -> &'static str {
            "fake"
        }

        fn releases_url(&self, _owner: &str, _repo: &str, _page: usize, _per_page: usize) -> String {
            String::new()
        }

        async fn fetch_releases(
            &self,
            owner: &str,
            repo: &str,
            options: &FetchOptions,
        ) -> Result<Vec<RawRelease>> {
            self.calls
                .lock()
                .unwrap()
                .push((owner.to_string(), repo.to_string(), options.count));
            self.outcome.clone()
        }
    }

    #[tokio::test]
    async fn test_fetch_stamps_display_names() {
        let tool = ToolDescriptor::github("kubectx", "ahmetb", "kubectx")
            .with_display_names(&["kubectx", "kubens"]);
        let provider = FakeProvider::new(Ok(vec![RawRelease::new("v0.9.5")]));
        let options = FetchOptions {
            count: Some(3),
            ..Default::default()
        };

        let feed = ToolAdapter::new(&tool, &provider).fetch(&options).await.unwrap();
        assert_eq!(feed.tool_names, vec!["kubectx", "kubens"]);
        assert_eq!(feed.releases.len(), 1);
        assert_eq!(
            provider.calls.lock().unwrap().as_slice(),
            &[("ahmetb".to_string(), "kubectx".to_string(), Some(3))]
        );
    }

    #[tokio::test]
    async fn test_fetch_falls_back_to_tool_name() {
        let tool = ToolDescriptor::github("k9s", "derailed", "k9s");
        let provider = FakeProvider::new(Ok(vec![]));
        let feed = ToolAdapter::new(&tool, &provider)
            .fetch(&FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(feed.tool_names, vec!["k9s"]);
        assert!(feed.releases.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_propagates_errors() {
        let tool = ToolDescriptor::github("kubectx", "ahmetb", "kubectx");
        let provider = FakeProvider::new(Err(ProviderError::not_found("ahmetb", "kubectx")));
        let err = ToolAdapter::new(&tool, &provider)
            .fetch(&FetchOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::not_found("ahmetb", "kubectx"));
    }
}
