use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/netinformer/config.yaml";
pub const DEFAULT_NETNS_DIR: &str = "/var/run/netns";
pub const DEFAULT_CURRENT_NETNS: &str = "/proc/thread-self/ns/net";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("unknown output format '{}' (expected text or json)", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding named namespace handles.
    pub netns_dir: PathBuf,
    /// Handle of the calling thread's own namespace.
    pub current_netns_path: PathBuf,
    pub format: OutputFormat,
    /// Show the current namespace alongside named ones.
    pub include_current: bool,
    /// Namespaces shown when none are given on the command line.
    pub namespaces: Vec<String>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse config YAML")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config from {:?}", path))?;
        Self::from_yaml(&content)
    }

    /// Load an explicit file, else the system-wide file if present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let system = Path::new(DEFAULT_CONFIG_PATH);
        if system.exists() {
            tracing::debug!(path = %system.display(), "loading system config");
            return Self::from_file(system);
        }

        Ok(Self::default())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            netns_dir: PathBuf::from(DEFAULT_NETNS_DIR),
            current_netns_path: PathBuf::from(DEFAULT_CURRENT_NETNS),
            format: OutputFormat::Text,
            include_current: true,
            namespaces: Vec::new(),
        }
    }
}
