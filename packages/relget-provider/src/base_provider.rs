use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use relget_utils::http::{get, http_status_is_ok, ResponseData};

use crate::data::RawRelease;
use crate::error::{ProviderError, Result};
use crate::wire::parse_release_list;

/// Largest page either provider will return.
pub const MAX_PAGE_SIZE: usize = 100;

pub const USER_AGENT: &str = concat!("relget/", env!("CARGO_PKG_VERSION"));

/// Per-call knobs for a release listing request.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// How many releases the caller needs. `None` fetches one full page.
    pub count: Option<usize>,
    /// API token; blank tokens are ignored.
    pub token: Option<String>,
    pub timeout: Option<Duration>,
}

impl FetchOptions {
    pub(crate) fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Page size and number of pages needed to satisfy `count`.
    pub(crate) fn page_plan(&self) -> (usize, usize) {
        match self.count {
            Some(0) => (1, 1),
            Some(count) if count <= MAX_PAGE_SIZE => (count, 1),
            Some(count) => (MAX_PAGE_SIZE, count.div_ceil(MAX_PAGE_SIZE)),
            None => (MAX_PAGE_SIZE, 1),
        }
    }
}

#[async_trait]
pub trait ReleaseProvider: Send + Sync {
    fn get_friendly_name(&self) -> &'static str;

    /// URL of one page (1-based) of the owner/repo release listing.
    fn releases_url(&self, owner: &str, repo: &str, page: usize, per_page: usize) -> String;

    /// Headers sent with every listing request.
    fn request_headers(&self, options: &FetchOptions) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("User-Agent".to_string(), USER_AGENT.to_string());
        if let Some(token) = options.token() {
            map.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        map
    }

    /// List releases in provider order.
    ///
    /// One request is made unless `options.count` is larger than a page; then
    /// pages are requested until the count is met or the listing runs out.
    async fn fetch_releases(
        &self,
        owner: &str,
        repo: &str,
        options: &FetchOptions,
    ) -> Result<Vec<RawRelease>> {
        let provider = self.get_friendly_name();
        let headers = self.request_headers(options);
        let (per_page, pages) = options.page_plan();

        let mut releases = Vec::new();
        for page in 1..=pages {
            let url = self.releases_url(owner, repo, page, per_page);
            debug!(provider, %url, page, "fetching releases");
            let parsed_url = url
                .parse::<hyper::Uri>()
                .map_err(|e| ProviderError::network(format!("invalid url {}: {}", url, e)))?;
            let rsp = get(parsed_url, &headers, options.timeout)
                .await
                .map_err(|e| ProviderError::network(e.to_string()))?;
            let body = check_response(provider, owner, repo, rsp)?;
            let batch = parse_release_list(provider, &body)?;
            // drafts and malformed entries are dropped after decoding, so
            // judge the page by what the provider sent
            let short_page = batch.listed < per_page;
            releases.extend(batch.releases);
            if short_page {
                break;
            }
        }
        if let Some(count) = options.count {
            releases.truncate(count);
        }
        Ok(releases)
    }
}

/// Map an HTTP response onto the provider error taxonomy, returning the body
/// of a successful response.
pub fn check_response(provider: &str, owner: &str, repo: &str, rsp: ResponseData) -> Result<Bytes> {
    if http_status_is_ok(rsp.status) {
        return Ok(rsp.body.unwrap_or_default());
    }
    match rsp.status {
        404 => Err(ProviderError::not_found(owner, repo)),
        429 => Err(ProviderError::RateLimited {
            provider: provider.to_string(),
            retry_after: retry_after(&rsp),
        }),
        403 if rsp.header("x-ratelimit-remaining") == Some("0") => {
            Err(ProviderError::RateLimited {
                provider: provider.to_string(),
                retry_after: retry_after(&rsp),
            })
        }
        status => Err(ProviderError::network(format!(
            "{} answered HTTP {} for {}/{}",
            provider, status, owner, repo
        ))),
    }
}

fn retry_after(rsp: &ResponseData) -> Option<u64> {
    if let Some(secs) = rsp.header("retry-after").and_then(|v| v.trim().parse().ok()) {
        return Some(secs);
    }
    let reset: i64 = rsp.header("x-ratelimit-reset")?.trim().parse().ok()?;
    Some((reset - chrono::Utc::now().timestamp()).max(0) as u64)
}
