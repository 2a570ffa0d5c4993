use async_trait::async_trait;
use std::collections::HashMap;
use urlencoding::encode;

use crate::base_provider::{FetchOptions, ReleaseProvider, USER_AGENT};

pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Releases from GitHub, or any server speaking the GitHub REST API
/// (Enterprise installs, mirrors).
pub struct GitHubProvider {
    api_base: String,
}

impl Default for GitHubProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubProvider {
    pub fn new() -> Self {
        Self::with_api_base(GITHUB_API_URL)
    }

    pub fn with_api_base(api_base: &str) -> Self {
        GitHubProvider {
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

#[async_trait]
impl ReleaseProvider for GitHubProvider {
    fn get_friendly_name(&self) -> &'static str {
        "github"
    }

    fn releases_url(&self, owner: &str, repo: &str, page: usize, per_page: usize) -> String {
        let mut url = format!(
            "{}/repos/{}/{}/releases?per_page={}",
            self.api_base,
            encode(owner),
            encode(repo),
            per_page
        );
        if page > 1 {
            url.push_str(&format!("&page={}", page));
        }
        url
    }

    fn request_headers(&self, options: &FetchOptions) -> HashMap<String, String> {
        let mut map = HashMap::from([
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            (
                "Accept".to_string(),
                "application/vnd.github+json".to_string(),
            ),
            ("X-GitHub-Api-Version".to_string(), "2022-11-28".to_string()),
        ]);
        if let Some(token) = options.token() {
            map.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        map
    }
}
