// Release discovery: fetch a tool's releases, normalize them, pick from them

pub mod adapter;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod platform;
pub mod select;

pub use adapter::{ToolAdapter, ToolFeed};
pub use error::{Error, Result};
pub use normalize::{
    match_assets, normalize, normalize_releases, AssetRef, Channel, NormalizedRelease,
    NormalizedResult,
};
pub use pipeline::{resolve_tools, Pipeline};
pub use platform::{detect_asset_target, detect_extension, Arch, Os, ParsePlatformError, Platform};
pub use select::{pick_latest, retain_platform, select};

pub use relget_config::{Settings, ToolDescriptor, ToolRegistry};
pub use relget_provider::{FetchOptions, ProviderError, ProviderManager, ReleaseProvider};
pub use relget_utils::versioning::ParsedVersion;
