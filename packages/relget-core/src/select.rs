use crate::normalize::{AssetRef, NormalizedRelease, NormalizedResult};
use crate::platform::Platform;

/// Keep the `count` newest releases; a non-positive count keeps none.
pub fn select(mut result: NormalizedResult, count: i64) -> NormalizedResult {
    let keep = usize::try_from(count).unwrap_or(0);
    result.releases.truncate(keep);
    result
}

/// The newest release with an asset for `platform`, with that asset.
///
/// Prereleases (by flag or by version) are passed over unless allowed.
pub fn pick_latest(
    result: &NormalizedResult,
    platform: Platform,
    allow_prerelease: bool,
) -> Option<(&NormalizedRelease, &AssetRef)> {
    result
        .releases
        .iter()
        .filter(|release| allow_prerelease || !is_prerelease(release))
        .find_map(|release| release.asset_for(&platform).map(|asset| (release, asset)))
}

/// Drop every matched asset except the one for `platform`.
///
/// Releases without such an asset stay in place with an empty match set.
pub fn retain_platform(mut result: NormalizedResult, platform: Platform) -> NormalizedResult {
    for release in &mut result.releases {
        release.matched_assets.retain(|p, _| *p == platform);
    }
    result
}

fn is_prerelease(release: &NormalizedRelease) -> bool {
    release.is_prerelease || release.version.has_prerelease()
}
