//! Decoding of provider release listings.
//!
//! GitHub and Gitea both answer `/releases` with the same core fields, so one
//! decoder serves both. Entries are decoded one by one: a malformed release
//! or asset is dropped with a warning instead of failing the whole listing.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::data::{RawAsset, RawRelease};
use crate::error::{ProviderError, Result};

#[derive(Debug, Deserialize)]
struct WireRelease {
    tag_name: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    prerelease: bool,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    assets: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct WireAsset {
    name: String,
    browser_download_url: String,
    #[serde(default)]
    size: u64,
}

/// One decoded page of a release listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePage {
    pub releases: Vec<RawRelease>,
    /// Entries the provider sent, counting drafts and malformed ones.
    pub listed: usize,
}

/// Decode a release listing body into typed releases, preserving order.
///
/// Draft releases are skipped since they have no public downloads.
pub fn parse_release_list(provider: &str, body: &[u8]) -> Result<ReleasePage> {
    let entries: Vec<Value> = serde_json::from_slice(body)
        .map_err(|e| ProviderError::invalid_response(provider, e.to_string()))?;
    let listed = entries.len();

    let releases = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<WireRelease>(entry) {
            Ok(release) => Some(release),
            Err(e) => {
                warn!(provider, index, error = %e, "skipping malformed release entry");
                None
            }
        })
        .filter(|release| !release.draft)
        .map(|release| into_raw_release(provider, release))
        .collect();
    Ok(ReleasePage { releases, listed })
}

fn into_raw_release(provider: &str, release: WireRelease) -> RawRelease {
    let assets = release
        .assets
        .into_iter()
        .filter_map(|asset| match serde_json::from_value::<WireAsset>(asset) {
            Ok(asset) => Some(RawAsset {
                file_name: asset.name,
                download_url: asset.browser_download_url,
                size: asset.size,
            }),
            Err(e) => {
                warn!(provider, tag = %release.tag_name, error = %e, "skipping malformed asset");
                None
            }
        })
        .collect();

    RawRelease {
        name: release
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| release.tag_name.clone()),
        tag: release.tag_name,
        is_prerelease: release.prerelease,
        published_at: release.published_at.or(release.created_at),
        assets,
    }
}
