use async_trait::async_trait;
use std::collections::HashMap;
use urlencoding::encode;

use crate::base_provider::{FetchOptions, ReleaseProvider, USER_AGENT};

pub const CODEBERG_API_URL: &str = "https://codeberg.org/api/v1";

/// Releases from a Gitea or Forgejo instance, Codeberg by default.
pub struct GiteaProvider {
    api_base: String,
}

impl Default for GiteaProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GiteaProvider {
    pub fn new() -> Self {
        Self::with_api_base(CODEBERG_API_URL)
    }

    /// `api_base` includes the `/api/v1` suffix.
    pub fn with_api_base(api_base: &str) -> Self {
        GiteaProvider {
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ReleaseProvider for GiteaProvider {
    fn get_friendly_name(&self) -> &'static str {
        "gitea"
    }

    fn releases_url(&self, owner: &str, repo: &str, page: usize, per_page: usize) -> String {
        format!(
            "{}/repos/{}/{}/releases?page={}&limit={}",
            self.api_base,
            encode(owner),
            encode(repo),
            page,
            per_page
        )
    }

    // Gitea expects the `token` scheme rather than `Bearer`.
    fn request_headers(&self, options: &FetchOptions) -> HashMap<String, String> {
        let mut map = HashMap::from([
            ("User-Agent".to_string(), USER_AGENT.to_string()),
            ("Accept".to_string(), "application/json".to_string()),
        ]);
        if let Some(token) = options.token() {
            map.insert("Authorization".to_string(), format!("token {}", token));
        }
        map
    }
}
