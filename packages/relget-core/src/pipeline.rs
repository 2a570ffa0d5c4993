//! Fetch-and-normalize for one tool or a batch of tools.

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use relget_config::{Settings, ToolDescriptor, ToolRegistry};
use relget_provider::{
    FetchOptions, GiteaProvider, GitHubProvider, ProviderError, ProviderManager,
};

use crate::adapter::ToolAdapter;
use crate::error::{Error, Result};
use crate::normalize::{normalize, NormalizedResult};

pub struct Pipeline {
    providers: ProviderManager,
    settings: Settings,
    fetch_count: Option<usize>,
}

impl Pipeline {
    /// Default providers, pointed at any API bases overridden in `settings`.
    pub fn new(settings: Settings) -> Self {
        let mut providers = ProviderManager::with_defaults();
        if let Some(base) = settings.github_api.as_deref() {
            providers.register_provider(Box::new(GitHubProvider::with_api_base(base)));
        }
        if let Some(base) = settings.gitea_api.as_deref() {
            providers.register_provider(Box::new(GiteaProvider::with_api_base(base)));
        }
        Self::with_providers(providers, settings)
    }

    pub fn with_providers(providers: ProviderManager, settings: Settings) -> Self {
        Self {
            providers,
            settings,
            fetch_count: None,
        }
    }

    /// How many releases to request per tool. `None` (the default) takes one
    /// full page; provider order is not version order, so trimming belongs
    /// after normalization.
    pub fn with_fetch_count(mut self, count: Option<usize>) -> Self {
        self.fetch_count = count;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn providers(&self) -> &ProviderManager {
        &self.providers
    }

    fn fetch_options(&self, tool: &ToolDescriptor) -> FetchOptions {
        FetchOptions {
            count: self.fetch_count,
            token: self.settings.token_for(&tool.provider).map(str::to_string),
            timeout: Some(self.settings.timeout),
        }
    }

    /// Fetch one tool's releases and normalize them.
    ///
    /// A cancelled token wins over an in-flight request; nothing is
    /// normalized in that case.
    pub async fn fetch_tool(
        &self,
        tool: &ToolDescriptor,
        cancel: &CancellationToken,
    ) -> Result<NormalizedResult> {
        let provider = self
            .providers
            .get_provider(&tool.provider)
            .ok_or_else(|| Error::UnknownProvider {
                tool: tool.name.clone(),
                provider: tool.provider.clone(),
            })?;
        let options = self.fetch_options(tool);
        let adapter = ToolAdapter::new(tool, provider);

        let feed = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(tool = %tool.name, "fetch cancelled");
                return Err(ProviderError::Cancelled.into());
            }
            feed = adapter.fetch(&options) => feed?,
        };

        let fetched = feed.releases.len();
        let result = normalize(feed);
        info!(
            tool = %tool.name,
            fetched,
            releases = result.releases.len(),
            "fetched releases"
        );
        Ok(result)
    }

    /// Fetch several tools with at most `settings.concurrency` requests in
    /// flight. Results come back in input order.
    pub async fn fetch_many(
        &self,
        tools: &[&ToolDescriptor],
        cancel: &CancellationToken,
    ) -> Vec<Result<NormalizedResult>> {
        let limit = self.settings.concurrency.max(1);
        debug!(tools = tools.len(), limit, "fetching batch");
        let results: Vec<Result<NormalizedResult>> = stream::iter(tools.iter().copied())
            .map(|tool| self.fetch_tool(tool, cancel))
            .buffered(limit)
            .collect()
            .await;
        for (tool, result) in tools.iter().zip(&results) {
            if let Err(e) = result {
                warn!(tool = %tool.name, error = %e, "fetch failed");
            }
        }
        results
    }
}

/// Look up tools by name (or display-name alias), failing on the first
/// unknown one.
pub fn resolve_tools<'r, S: AsRef<str>>(
    registry: &'r ToolRegistry,
    names: &[S],
) -> Result<Vec<&'r ToolDescriptor>> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            registry
                .get(name)
                .ok_or_else(|| Error::UnknownTool(name.to_string()))
        })
        .collect()
}
