use std::time::Duration;
use tracing::warn;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Runtime settings shared by every fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub github_token: Option<String>,
    pub gitea_token: Option<String>,
    /// Overrides the public GitHub API base URL.
    pub github_api: Option<String>,
    /// Overrides the Gitea API base URL (including `/api/v1`).
    pub gitea_api: Option<String>,
    pub timeout: Duration,
    /// Upper bound on simultaneous provider requests in batch mode.
    pub concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            github_token: None,
            gitea_token: None,
            github_api: None,
            gitea_api: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from a variable lookup; unset or blank variables keep
    /// the defaults and malformed numbers are reported and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Self {
            github_token: var("GITHUB_TOKEN").or_else(|| var("GH_TOKEN")),
            gitea_token: var("GITEA_TOKEN"),
            github_api: var("RELGET_GITHUB_API"),
            gitea_api: var("RELGET_GITEA_API"),
            ..Self::default()
        };
        if let Some(raw) = var("RELGET_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => settings.timeout = Duration::from_secs(secs),
                _ => warn!(value = %raw, "ignoring invalid RELGET_TIMEOUT_SECS"),
            }
        }
        if let Some(raw) = var("RELGET_CONCURRENCY") {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => settings.concurrency = n,
                _ => warn!(value = %raw, "ignoring invalid RELGET_CONCURRENCY"),
            }
        }
        settings
    }

    pub fn token_for(&self, provider: &str) -> Option<&str> {
        match provider {
            "github" => self.github_token.as_deref(),
            "gitea" => self.gitea_token.as_deref(),
            _ => None,
        }
    }
}
