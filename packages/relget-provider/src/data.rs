use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One release exactly as the provider listed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRelease {
    pub tag: String,
    pub name: String,
    pub is_prerelease: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub assets: Vec<RawAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAsset {
    pub file_name: String,
    pub download_url: String,
    pub size: u64,
}

impl RawRelease {
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self {
            name: tag.clone(),
            tag,
            is_prerelease: false,
            published_at: None,
            assets: vec![],
        }
    }

    pub fn prerelease(mut self, is_prerelease: bool) -> Self {
        self.is_prerelease = is_prerelease;
        self
    }

    pub fn published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn asset(mut self, asset: RawAsset) -> Self {
        self.assets.push(asset);
        self
    }
}

impl RawAsset {
    pub fn new(file_name: impl Into<String>, download_url: impl Into<String>, size: u64) -> Self {
        Self {
            file_name: file_name.into(),
            download_url: download_url.into(),
            size,
        }
    }
}
