//! Operating system and CPU architecture detection.
//!
//! Release assets rarely agree on naming (`x86_64`, `amd64`, `x64`; `darwin`,
//! `macos`, `apple`), so file names are matched against alias patterns and
//! folded onto one canonical spelling per OS and architecture.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Os {
    Linux,
    Darwin,
    Windows,
    FreeBsd,
    OpenBsd,
    NetBsd,
    Android,
    Illumos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Arch {
    Amd64,
    Arm64,
    Armv7,
    Armv6,
    X86,
    Ppc64le,
    S390x,
    Riscv64,
}

impl Os {
    pub const ALL: [Os; 8] = [
        Os::Linux,
        Os::Darwin,
        Os::Windows,
        Os::FreeBsd,
        Os::OpenBsd,
        Os::NetBsd,
        Os::Android,
        Os::Illumos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
            Os::Windows => "windows",
            Os::FreeBsd => "freebsd",
            Os::OpenBsd => "openbsd",
            Os::NetBsd => "netbsd",
            Os::Android => "android",
            Os::Illumos => "illumos",
        }
    }

    pub fn current() -> Option<Os> {
        Os::parse(std::env::consts::OS)
    }

    /// Accepts canonical names and common aliases, case-insensitively.
    pub fn parse(s: &str) -> Option<Os> {
        detect_os(&s.to_ascii_lowercase())
    }
}

impl Arch {
    pub const ALL: [Arch; 8] = [
        Arch::Amd64,
        Arch::Arm64,
        Arch::Armv7,
        Arch::Armv6,
        Arch::X86,
        Arch::Ppc64le,
        Arch::S390x,
        Arch::Riscv64,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Amd64 => "amd64",
            Arch::Arm64 => "arm64",
            Arch::Armv7 => "armv7",
            Arch::Armv6 => "armv6",
            Arch::X86 => "x86",
            Arch::Ppc64le => "ppc64le",
            Arch::S390x => "s390x",
            Arch::Riscv64 => "riscv64",
        }
    }

    pub fn current() -> Option<Arch> {
        match std::env::consts::ARCH {
            "arm" => Some(Arch::Armv7),
            other => Arch::parse(other),
        }
    }

    pub fn parse(s: &str) -> Option<Arch> {
        detect_arch(&s.to_ascii_lowercase())
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An (os, arch) pair, rendered as `os-arch` (e.g. `linux-amd64`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(into = "String", try_from = "String")]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
}

impl Platform {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// The platform this binary was built for, when it is one we know.
    pub fn current() -> Option<Platform> {
        Some(Platform::new(Os::current()?, Arch::current()?))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePlatformError(pub String);

impl fmt::Display for ParsePlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized platform '{}'", self.0)
    }
}

impl std::error::Error for ParsePlatformError {}

impl FromStr for Platform {
    type Err = ParsePlatformError;

    /// Parses `os-arch`; aliases are accepted (`macos-x86_64`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePlatformError(s.to_string());
        let (os, arch) = s.split_once('-').ok_or_else(err)?;
        Ok(Platform::new(
            Os::parse(os).ok_or_else(err)?,
            Arch::parse(arch).ok_or_else(err)?,
        ))
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.to_string()
    }
}

impl TryFrom<String> for Platform {
    type Error = ParsePlatformError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// How an asset name pins down its architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchMatch {
    Exact(Arch),
    /// Marked `universal`: one file for every macOS architecture.
    Universal,
    /// No architecture in the name.
    Unspecified,
}

/// What an asset file name says about where it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetTarget {
    pub os: Os,
    pub arch: ArchMatch,
}

impl AssetTarget {
    /// Platforms this asset can serve, each flagged `true` for an exact
    /// architecture match.
    ///
    /// Names without an architecture are taken as amd64 builds, and on darwin
    /// also as arm64 ones (Rosetta runs them).
    pub fn candidates(&self) -> Vec<(Platform, bool)> {
        match self.arch {
            ArchMatch::Exact(arch) => vec![(Platform::new(self.os, arch), true)],
            ArchMatch::Universal => vec![
                (Platform::new(self.os, Arch::Amd64), false),
                (Platform::new(self.os, Arch::Arm64), false),
            ],
            ArchMatch::Unspecified if self.os == Os::Darwin => vec![
                (Platform::new(self.os, Arch::Amd64), false),
                (Platform::new(self.os, Arch::Arm64), false),
            ],
            ArchMatch::Unspecified => vec![(Platform::new(self.os, Arch::Amd64), false)],
        }
    }
}

// Aliases must sit between non-alphanumeric characters (or the ends).
fn token_regex(alternatives: &str) -> Regex {
    Regex::new(&format!(r"(?:^|[^a-z0-9])(?:{})(?:$|[^a-z0-9])", alternatives)).unwrap()
}

// Order matters: the first matching entry wins.
static OS_PATTERNS: Lazy<Vec<(Os, Regex)>> = Lazy::new(|| {
    vec![
        (Os::Android, token_regex("android")),
        (Os::Darwin, token_regex("darwin|macos|macosx|mac|osx|apple")),
        (Os::Windows, token_regex("windows|win|win32|win64|mingw|mingw32|mingw64")),
        (Os::FreeBsd, token_regex("freebsd")),
        (Os::OpenBsd, token_regex("openbsd")),
        (Os::NetBsd, token_regex("netbsd")),
        (Os::Illumos, token_regex("illumos|solaris|sunos")),
        (Os::Linux, token_regex("linux|musl|gnu")),
    ]
});

static ARCH_PATTERNS: Lazy<Vec<(Arch, Regex)>> = Lazy::new(|| {
    vec![
        (Arch::Amd64, token_regex("amd64|x86_64|x86-64|x64|64bit|win64")),
        (Arch::Arm64, token_regex("arm64|aarch64|armv8|armv8l|arm64e")),
        (Arch::Armv7, token_regex("armv7|armv7l|armv7hf|armhf|arm7|gnueabihf")),
        (Arch::Armv6, token_regex("armv6|armv6l|arm6|armel|arm")),
        (Arch::X86, token_regex("386|i386|i686|x86|32bit|win32")),
        (Arch::Ppc64le, token_regex("ppc64le|powerpc64le")),
        (Arch::S390x, token_regex("s390x")),
        (Arch::Riscv64, token_regex("riscv64|riscv64gc")),
    ]
});

static UNIVERSAL_PATTERN: Lazy<Regex> = Lazy::new(|| token_regex("universal|universal2|fat"));

// Checksums, signatures, metadata and distro packages never match a platform.
static SKIPPED_SUFFIXES: &[&str] = &[
    ".sha1", ".sha256", ".sha256sum", ".sha512", ".sha512sum", ".md5", ".sig", ".asc",
    ".pem", ".cert", ".crt", ".sbom", ".spdx", ".json", ".jsonl", ".txt", ".minisig",
    ".deb", ".rpm", ".apk", ".snap", ".flatpak", ".msi", ".pkg", ".dmg",
];

static ARCHIVE_EXTENSIONS: &[&str] = &[
    "tar.gz", "tar.xz", "tar.bz2", "tar.zst", "tgz", "txz", "tbz", "zip", "7z", "exe", "gz",
    "xz", "bz2", "zst",
];

fn detect_os(lower: &str) -> Option<Os> {
    OS_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(lower))
        .map(|(os, _)| *os)
}

fn detect_arch(lower: &str) -> Option<Arch> {
    ARCH_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(lower))
        .map(|(arch, _)| *arch)
}

/// Work out which OS/arch an asset file name targets.
///
/// Returns `None` for non-installable files (checksums, signatures, distro
/// packages) and for names that do not mention an OS; a bare `.exe` counts
/// as Windows.
pub fn detect_asset_target(file_name: &str) -> Option<AssetTarget> {
    let lower = file_name.to_ascii_lowercase();
    if lower.contains("checksum") || SKIPPED_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        return None;
    }
    let os = detect_os(&lower).or_else(|| lower.ends_with(".exe").then_some(Os::Windows))?;
    let arch = match detect_arch(&lower) {
        Some(arch) => ArchMatch::Exact(arch),
        None if UNIVERSAL_PATTERN.is_match(&lower) => ArchMatch::Universal,
        None => ArchMatch::Unspecified,
    };
    Some(AssetTarget { os, arch })
}

/// Archive or executable extension of an asset, if it has a known one.
pub fn detect_extension(file_name: &str) -> Option<&'static str> {
    let lower = file_name.to_ascii_lowercase();
    ARCHIVE_EXTENSIONS
        .iter()
        .find(|ext| {
            lower.len() > ext.len() + 1
                && lower.ends_with(*ext)
                && lower.as_bytes()[lower.len() - ext.len() - 1] == b'.'
        })
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(name: &str) -> Option<(Os, ArchMatch)> {
        detect_asset_target(name).map(|t| (t.os, t.arch))
    }

    #[test]
    fn test_detect_kubectx_assets() {
        use ArchMatch::Exact;
        assert_eq!(
            target("kubectx_v0.9.5_darwin_arm64.tar.gz"),
            Some((Os::Darwin, Exact(Arch::Arm64)))
        );
        assert_eq!(
            target("kubectx_v0.9.5_darwin_x86_64.tar.gz"),
            Some((Os::Darwin, Exact(Arch::Amd64)))
        );
        assert_eq!(
            target("kubectx_v0.9.5_linux_armv7.tar.gz"),
            Some((Os::Linux, Exact(Arch::Armv7)))
        );
        assert_eq!(
            target("kubens_v0.9.5_windows_x86_64.zip"),
            Some((Os::Windows, Exact(Arch::Amd64)))
        );
        assert_eq!(target("kubectx"), None);
        assert_eq!(target("checksums.txt"), None);
    }

    #[test]
    fn test_detect_rust_target_triples() {
        use ArchMatch::Exact;
        assert_eq!(
            target("ripgrep-14.1.0-aarch64-apple-darwin.tar.gz"),
            Some((Os::Darwin, Exact(Arch::Arm64)))
        );
        assert_eq!(
            target("ripgrep-14.1.0-x86_64-unknown-linux-musl.tar.gz"),
            Some((Os::Linux, Exact(Arch::Amd64)))
        );
        assert_eq!(
            target("ripgrep-14.1.0-i686-pc-windows-msvc.zip"),
            Some((Os::Windows, Exact(Arch::X86)))
        );
        assert_eq!(
            target("ripgrep-14.1.0-armv7-unknown-linux-gnueabihf.tar.gz"),
            Some((Os::Linux, Exact(Arch::Armv7)))
        );
        assert_eq!(
            target("fd-v10.1.0-arm-unknown-linux-gnueabihf.tar.gz"),
            Some((Os::Linux, Exact(Arch::Armv7)))
        );
        assert_eq!(
            target("fd-v10.1.0-arm-unknown-linux-musleabihf.tar.gz"),
            Some((Os::Linux, Exact(Arch::Armv6)))
        );
    }

    #[test]
    fn test_detect_generic_assets() {
        assert_eq!(
            target("tool-1.0.0-macos-universal.tar.gz"),
            Some((Os::Darwin, ArchMatch::Universal))
        );
        assert_eq!(
            target("tool-1.0.0-linux.tar.gz"),
            Some((Os::Linux, ArchMatch::Unspecified))
        );
        assert_eq!(target("tool.exe"), Some((Os::Windows, ArchMatch::Unspecified)));
        assert_eq!(
            target("jq-win64.exe"),
            Some((Os::Windows, ArchMatch::Exact(Arch::Amd64)))
        );
        assert_eq!(target("tool-1.0.0.tar.gz"), None);
    }

    #[test]
    fn test_skips_non_installables() {
        for name in [
            "tool_linux_amd64.tar.gz.sha256",
            "tool_linux_amd64.tar.gz.sig",
            "tool_1.0.0_checksums.txt",
            "tool_1.0.0_linux_amd64.deb",
            "tool-1.0.0-darwin-arm64.dmg",
            "tool_linux_amd64.sbom.json",
        ] {
            assert_eq!(detect_asset_target(name), None, "{name}");
        }
    }

    #[test]
    fn test_no_substring_false_positives() {
        // "darwin" contains "win", "machine" starts with "mac"
        assert_eq!(target("tool-darwin-arm64.zip").unwrap().0, Os::Darwin);
        assert_eq!(target("machine-tool-linux-amd64.tar.gz").unwrap().0, Os::Linux);
    }

    #[test]
    fn test_candidates() {
        let exact = AssetTarget {
            os: Os::Linux,
            arch: ArchMatch::Exact(Arch::Arm64),
        };
        assert_eq!(
            exact.candidates(),
            vec![(Platform::new(Os::Linux, Arch::Arm64), true)]
        );

        let generic = AssetTarget {
            os: Os::Linux,
            arch: ArchMatch::Unspecified,
        };
        assert_eq!(
            generic.candidates(),
            vec![(Platform::new(Os::Linux, Arch::Amd64), false)]
        );

        let mac = AssetTarget {
            os: Os::Darwin,
            arch: ArchMatch::Unspecified,
        };
        assert_eq!(mac.candidates().len(), 2);
    }

    #[test]
    fn test_detect_extension() {
        assert_eq!(detect_extension("a_linux_amd64.tar.gz"), Some("tar.gz"));
        assert_eq!(detect_extension("a.TGZ"), Some("tgz"));
        assert_eq!(detect_extension("a_windows.zip"), Some("zip"));
        assert_eq!(detect_extension("a.exe"), Some("exe"));
        assert_eq!(detect_extension("a-linux.xz"), Some("xz"));
        assert_eq!(detect_extension("kubectx"), None);
        assert_eq!(detect_extension("zip"), None);
    }

    #[test]
    fn test_platform_parse_and_display() {
        let p: Platform = "linux-amd64".parse().unwrap();
        assert_eq!(p, Platform::new(Os::Linux, Arch::Amd64));
        assert_eq!(p.to_string(), "linux-amd64");

        let p: Platform = "macos-aarch64".parse().unwrap();
        assert_eq!(p, Platform::new(Os::Darwin, Arch::Arm64));

        assert!("linux".parse::<Platform>().is_err());
        assert!("plan9-amd64".parse::<Platform>().is_err());
    }

    #[test]
    fn test_os_arch_aliases() {
        assert_eq!(Os::parse("macOS"), Some(Os::Darwin));
        assert_eq!(Os::parse("Windows"), Some(Os::Windows));
        assert_eq!(Arch::parse("x86_64"), Some(Arch::Amd64));
        assert_eq!(Arch::parse("aarch64"), Some(Arch::Arm64));
        assert_eq!(Arch::parse("i686"), Some(Arch::X86));
        for os in Os::ALL {
            assert_eq!(Os::parse(os.as_str()), Some(os));
        }
        for arch in Arch::ALL {
            assert_eq!(Arch::parse(arch.as_str()), Some(arch));
        }
    }

    #[test]
    fn test_platform_serde() {
        let p = Platform::new(Os::Darwin, Arch::Arm64);
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"darwin-arm64\"");
        let back: Platform = serde_json::from_str("\"darwin-arm64\"").unwrap();
        assert_eq!(back, p);
    }
}
