use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub const DEFAULT_PROVIDER: &str = "github";

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

/// Where a tool's releases live and what the tool is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Registry key, e.g. `kubectx`.
    pub name: String,
    #[serde(default = "default_provider")]
    pub provider: String,
    pub owner: String,
    pub repo: String,
    /// Names of the commands a release ships; `kubectx` also ships `kubens`.
    #[serde(default)]
    pub display_names: Vec<String>,
}

impl ToolDescriptor {
    pub fn github(name: &str, owner: &str, repo: &str) -> Self {
        Self {
            name: name.to_string(),
            provider: default_provider(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            display_names: vec![],
        }
    }

    pub fn with_provider(mut self, provider: &str) -> Self {
        self.provider = provider.to_string();
        self
    }

    pub fn with_display_names(mut self, names: &[&str]) -> Self {
        self.display_names = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Display names in declaration order without duplicates, falling back
    /// to the tool name when none are declared.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::with_capacity(self.display_names.len());
        for name in &self.display_names {
            let name = name.trim();
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        if names.is_empty() {
            names.push(self.name.clone());
        }
        names
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| ConfigError::InvalidTool {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.name.trim().is_empty() {
            return Err(invalid("empty name"));
        }
        if self.owner.trim().is_empty() || self.repo.trim().is_empty() {
            return Err(invalid("owner and repo are required"));
        }
        if self.owner.contains('/') || self.repo.contains('/') {
            return Err(invalid("owner and repo must not contain '/'"));
        }
        Ok(())
    }
}
