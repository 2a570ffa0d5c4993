use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProviderError>;

/// Failures a release provider can report to its caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Transport failure, timeout, or an unexpected HTTP status.
    #[error("network error: {0}")]
    Network(String),

    #[error("repository {owner}/{repo} not found")]
    NotFound { owner: String, repo: String },

    /// The provider throttled the caller.
    #[error("rate limited by {provider}{}", retry_hint(.retry_after))]
    RateLimited {
        provider: String,
        /// Seconds until the provider accepts requests again, when known.
        retry_after: Option<u64>,
    },

    /// The response body was not a release listing.
    #[error("invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    #[error("request cancelled")]
    Cancelled,
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(", retry in {}s", secs),
        None => String::new(),
    }
}

impl ProviderError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn not_found(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self::NotFound {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Network failures and rate limiting may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::RateLimited { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            ProviderError::not_found("ahmetb", "kubectx").to_string(),
            "repository ahmetb/kubectx not found"
        );
        assert_eq!(
            ProviderError::RateLimited {
                provider: "github".into(),
                retry_after: Some(30)
            }
            .to_string(),
            "rate limited by github, retry in 30s"
        );
        assert_eq!(
            ProviderError::RateLimited {
                provider: "github".into(),
                retry_after: None
            }
            .to_string(),
            "rate limited by github"
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(ProviderError::network("reset").is_retryable());
        assert!(ProviderError::RateLimited {
            provider: "gitea".into(),
            retry_after: None
        }
        .is_retryable());
        assert!(!ProviderError::not_found("a", "b").is_retryable());
        assert!(!ProviderError::Cancelled.is_retryable());
        assert!(!ProviderError::invalid_response("github", "not json").is_retryable());
    }
}
