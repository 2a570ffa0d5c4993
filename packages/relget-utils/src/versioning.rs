use once_cell::sync::Lazy;
use regex::Regex;
use semver::{BuildMetadata, Prerelease, Version};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

static TAG_VERSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[vV]?(?P<major>\d+)(?:\.(?P<minor>\d+))?(?:\.(?P<patch>\d+))?(?:-(?P<pre>[0-9A-Za-z.\-]+))?(?:\+(?P<build>[0-9A-Za-z.\-]+))?$",
    )
    .unwrap()
});

/// A release tag read as a semantic version when possible.
///
/// Tags that do not look like a version are kept verbatim in `Unparsed` so
/// they can still be ordered (after every parsed version) by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedVersion {
    Parsed(Version),
    Unparsed(String),
}

impl ParsedVersion {
    /// Parse a release tag.
    ///
    /// Accepts an optional path prefix (`kubectx/v0.9.5`), an optional `v`,
    /// one to three numeric components (missing ones become zero), and the
    /// usual `-pre` and `+build` suffixes.
    pub fn parse(tag: &str) -> Self {
        let trimmed = tag.trim();
        let candidate = trimmed.rsplit('/').next().unwrap_or(trimmed);
        match parse_lenient(candidate) {
            Some(version) => ParsedVersion::Parsed(version),
            None => ParsedVersion::Unparsed(tag.to_string()),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ParsedVersion::Parsed(_))
    }

    pub fn as_semver(&self) -> Option<&Version> {
        match self {
            ParsedVersion::Parsed(version) => Some(version),
            ParsedVersion::Unparsed(_) => None,
        }
    }

    /// True when the parsed version carries a pre-release component.
    pub fn has_prerelease(&self) -> bool {
        self.as_semver().is_some_and(|v| !v.pre.is_empty())
    }
}

impl fmt::Display for ParsedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedVersion::Parsed(version) => write!(f, "{}", version),
            ParsedVersion::Unparsed(tag) => write!(f, "{}", tag),
        }
    }
}

// Unparsed versions render as `null`: the raw tag is already on the release.
impl Serialize for ParsedVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParsedVersion::Parsed(version) => serializer.collect_str(version),
            ParsedVersion::Unparsed(_) => serializer.serialize_none(),
        }
    }
}

fn parse_lenient(candidate: &str) -> Option<Version> {
    let bare = candidate
        .strip_prefix(['v', 'V'])
        .unwrap_or(candidate);
    if let Ok(version) = Version::parse(bare) {
        return Some(version);
    }
    let caps = TAG_VERSION_REGEX.captures(candidate)?;
    let number = |name: &str| -> Option<u64> {
        match caps.name(name) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    let mut version = Version::new(number("major")?, number("minor")?, number("patch")?);
    if let Some(pre) = caps.name("pre") {
        version.pre = Prerelease::new(pre.as_str()).ok()?;
    }
    if let Some(build) = caps.name("build") {
        version.build = BuildMetadata::new(build.as_str()).ok()?;
    }
    Some(version)
}

/// Semantic-version precedence: major, minor, patch, then pre-release.
/// Build metadata does not take part.
pub fn cmp_precedence(a: &Version, b: &Version) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(tag: &str) -> Version {
        ParsedVersion::parse(tag)
            .as_semver()
            .cloned()
            .unwrap_or_else(|| panic!("{tag} should parse"))
    }

    #[test]
    fn test_parse_common_tags() {
        assert_eq!(parsed("v1.2.0"), Version::new(1, 2, 0));
        assert_eq!(parsed("0.9.5"), Version::new(0, 9, 5));
        assert_eq!(parsed("V3.1.4"), Version::new(3, 1, 4));
        assert_eq!(parsed("v2.0.0-beta").pre.as_str(), "beta");
        assert_eq!(parsed("1.0.0+build.7").build.as_str(), "build.7");
    }

    #[test]
    fn test_parse_short_versions_are_padded() {
        assert_eq!(parsed("v1.7"), Version::new(1, 7, 0));
        assert_eq!(parsed("15"), Version::new(15, 0, 0));
        assert_eq!(parsed("v1.7-rc1").pre.as_str(), "rc1");
    }

    #[test]
    fn test_parse_path_prefixed_tag() {
        assert_eq!(parsed("kubectx/v0.9.4"), Version::new(0, 9, 4));
    }

    #[test]
    fn test_unparsable_tags_are_kept() {
        for tag in [
            "garbage-tag",
            "nightly",
            "",
            "v",
            "1.2.3.4",
            "release_2020",
            "vv1.2.3",
            "vV1.0.0",
            "Vv2",
        ] {
            let version = ParsedVersion::parse(tag);
            assert_eq!(version, ParsedVersion::Unparsed(tag.to_string()), "{tag}");
            assert!(!version.is_parsed());
        }
    }

    #[test]
    fn test_precedence_orders_prerelease_below_release() {
        assert_eq!(
            cmp_precedence(&parsed("2.0.0-beta"), &parsed("2.0.0")),
            Ordering::Less
        );
        assert_eq!(
            cmp_precedence(&parsed("2.0.0-alpha"), &parsed("2.0.0-beta")),
            Ordering::Less
        );
        assert_eq!(
            cmp_precedence(&parsed("2.0.0-beta"), &parsed("1.9.9")),
            Ordering::Greater
        );
        assert_eq!(
            cmp_precedence(&parsed("1.0.0+a"), &parsed("1.0.0+b")),
            Ordering::Equal
        );
        assert_eq!(
            cmp_precedence(&parsed("1.10.0"), &parsed("1.9.0")),
            Ordering::Greater
        );
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ParsedVersion::parse("v1.2.0")).unwrap();
        assert_eq!(json, "\"1.2.0\"");
        let json = serde_json::to_string(&ParsedVersion::parse("garbage-tag")).unwrap();
        assert_eq!(json, "null");
    }

    #[test]
    fn test_has_prerelease() {
        assert!(!ParsedVersion::parse("x").has_prerelease());
        assert!(!ParsedVersion::parse("1.0.0").has_prerelease());
        assert!(ParsedVersion::parse("1.0.0-rc.1").has_prerelease());
    }
}
