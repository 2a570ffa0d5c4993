//! Turns a provider's release feed into the canonical, version-sorted list.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use relget_provider::{RawAsset, RawRelease};
use relget_utils::versioning::{cmp_precedence, ParsedVersion};

use crate::adapter::ToolFeed;
use crate::platform::{detect_asset_target, detect_extension, Platform};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    pub file_name: String,
    pub download_url: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Stable,
    Beta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRelease {
    pub version: ParsedVersion,
    pub tag: String,
    pub name: String,
    pub is_prerelease: bool,
    pub channel: Channel,
    pub published_at: Option<DateTime<Utc>>,
    pub matched_assets: BTreeMap<Platform, AssetRef>,
}

impl NormalizedRelease {
    pub fn asset_for(&self, platform: &Platform) -> Option<&AssetRef> {
        self.matched_assets.get(platform)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
    pub tool_names: Vec<String>,
    pub releases: Vec<NormalizedRelease>,
}

/// Normalize a tool's release feed, keeping its display names.
pub fn normalize(feed: ToolFeed) -> NormalizedResult {
    NormalizedResult {
        tool_names: feed.tool_names,
        releases: normalize_releases(feed.releases),
    }
}

/// Deduplicate by tag (first wins), parse versions, match assets to
/// platforms, then sort newest first.
///
/// Parsed versions come first in descending precedence; at equal precedence
/// a non-prerelease sorts before a prerelease, then the newer publish date,
/// then the smaller tag. Unparsable tags follow, newest publish date first.
/// The order does not depend on the input order once tags are unique.
pub fn normalize_releases(raw: Vec<RawRelease>) -> Vec<NormalizedRelease> {
    let total = raw.len();
    let mut seen = HashSet::with_capacity(total);
    let mut releases: Vec<NormalizedRelease> = raw
        .into_iter()
        .filter(|release| seen.insert(release.tag.clone()))
        .map(normalize_release)
        .collect();
    releases.sort_by(compare_releases);
    debug!(
        total,
        kept = releases.len(),
        unparsed = releases.iter().filter(|r| !r.version.is_parsed()).count(),
        "normalized releases"
    );
    releases
}

fn normalize_release(raw: RawRelease) -> NormalizedRelease {
    let version = ParsedVersion::parse(&raw.tag);
    let channel = if raw.is_prerelease || version.has_prerelease() {
        Channel::Beta
    } else {
        Channel::Stable
    };
    NormalizedRelease {
        matched_assets: match_assets(&raw.assets),
        version,
        tag: raw.tag,
        name: raw.name,
        is_prerelease: raw.is_prerelease,
        channel,
        published_at: raw.published_at,
    }
}

/// Pick one asset per platform: an exact architecture match beats a generic
/// one, and among equals the first in provider order wins.
pub fn match_assets(assets: &[RawAsset]) -> BTreeMap<Platform, AssetRef> {
    let mut best: BTreeMap<Platform, (bool, &RawAsset)> = BTreeMap::new();
    for asset in assets {
        let Some(target) = detect_asset_target(&asset.file_name) else {
            continue;
        };
        for (platform, exact) in target.candidates() {
            match best.get(&platform) {
                Some((held_exact, _)) if *held_exact || !exact => {}
                _ => {
                    best.insert(platform, (exact, asset));
                }
            }
        }
    }
    best.into_iter()
        .map(|(platform, (_, asset))| {
            (
                platform,
                AssetRef {
                    file_name: asset.file_name.clone(),
                    download_url: asset.download_url.clone(),
                    size: asset.size,
                    ext: detect_extension(&asset.file_name).map(str::to_string),
                },
            )
        })
        .collect()
}

fn compare_releases(a: &NormalizedRelease, b: &NormalizedRelease) -> Ordering {
    match (a.version.as_semver(), b.version.as_semver()) {
        (Some(va), Some(vb)) => cmp_precedence(vb, va)
            .then(a.is_prerelease.cmp(&b.is_prerelease))
            .then_with(|| newest_first(a.published_at, b.published_at))
            .then_with(|| a.tag.cmp(&b.tag)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => newest_first(a.published_at, b.published_at).then_with(|| a.tag.cmp(&b.tag)),
    }
}

// Missing timestamps sort last.
fn newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
