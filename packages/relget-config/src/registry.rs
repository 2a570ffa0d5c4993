use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::tool::ToolDescriptor;

/// On-disk shape of a tools file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ToolsFile {
    #[serde(default)]
    pub tools: Vec<ToolDescriptor>,
}

/// Known tools keyed by name. Built once at start-up and shared by reference.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for tool in [
            ToolDescriptor::github("kubectx", "ahmetb", "kubectx")
                .with_display_names(&["kubectx", "kubens"]),
            ToolDescriptor::github("k9s", "derailed", "k9s"),
            ToolDescriptor::github("kind", "kubernetes-sigs", "kind"),
            ToolDescriptor::github("rg", "BurntSushi", "ripgrep").with_display_names(&["rg"]),
            ToolDescriptor::github("fd", "sharkdp", "fd"),
            ToolDescriptor::github("bat", "sharkdp", "bat"),
            ToolDescriptor::github("jq", "jqlang", "jq"),
            ToolDescriptor::github("yq", "mikefarah", "yq"),
            ToolDescriptor::github("gh", "cli", "cli").with_display_names(&["gh"]),
            ToolDescriptor::github("shellcheck", "koalaman", "shellcheck"),
            ToolDescriptor::github("forgejo", "forgejo", "forgejo").with_provider("gitea"),
        ] {
            registry.tools.insert(tool.name.clone(), tool);
        }
        registry
    }

    /// Built-in tools overlaid with the entries of a tools file.
    pub fn load(path: &Path) -> Result<Self> {
        let mut registry = Self::builtin();
        registry.merge_file(path)?;
        Ok(registry)
    }

    /// Add every tool from a JSON tools file, replacing same-named entries.
    pub fn merge_file(&mut self, path: &Path) -> Result<&mut Self> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tools_file: ToolsFile =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        for tool in tools_file.tools {
            self.insert(tool)?;
        }
        debug!(path = %path.display(), tools = self.tools.len(), "merged tools file");
        Ok(self)
    }

    pub fn insert(&mut self, tool: ToolDescriptor) -> Result<()> {
        tool.validate()?;
        self.tools.insert(tool.name.clone(), tool);
        Ok(())
    }

    /// Look a tool up by name, then by any of its display names.
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name).or_else(|| {
            self.tools
                .values()
                .find(|tool| tool.display_names.iter().any(|n| n == name))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
