use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_MAX_DEPTH: usize = 64;
pub const DEFAULT_MAX_ARGS: usize = 25;
pub const DEFAULT_CONFIG_FILE: &str = "config.cfg";

/// Tunables of the console dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    /// Maximum nesting of alias expansions and sub-expressions per dispatch.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Maximum words per statement, command name included.
    #[serde(default = "default_max_args")]
    pub max_args: usize,
    /// File written by `writecfg` when no name is given.
    #[serde(default = "default_config_file")]
    pub default_config_file: String,
    /// Scripts executed when a host starts the console.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub autoexec: Vec<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_args: default_max_args(),
            default_config_file: default_config_file(),
            autoexec: Vec::new(),
        }
    }
}

impl ConsoleConfig {
    /// Parses a `<console>` document; absent elements keep their defaults.
    ///
    /// ```xml
    /// <console>
    ///     <max-depth>32</max-depth>
    ///     <max-args>25</max-args>
    ///     <default-config-file>config.cfg</default-config-file>
    ///     <exec>autoexec.cfg</exec>
    /// </console>
    /// ```
    pub fn from_xml(xml: &str) -> Result<Self, ConfigError> {
        let document = Document::parse(xml)?;
        let root = document.root_element();
        if !root.has_tag_name("console") {
            return Err(ConfigError::UnexpectedRoot(
                root.tag_name().name().to_string(),
            ));
        }

        let mut config = ConsoleConfig::default();
        config.max_depth = parse_limit(optional_text(&root, "max-depth"), "max-depth", config.max_depth)?;
        config.max_args = parse_limit(optional_text(&root, "max-args"), "max-args", config.max_args)?;
        if let Some(file) = optional_text(&root, "default-config-file") {
            config.default_config_file = file;
        }
        config.autoexec = root
            .children()
            .filter(|child| child.has_tag_name("exec"))
            .filter_map(|child| child.text())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .collect();
        Ok(config)
    }

    /// Reads and parses a configuration file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let xml = fs::read_to_string(path)
            .with_context(|| format!("unable to read console config {}", path.display()))?;
        Self::from_xml(&xml)
            .with_context(|| format!("invalid console config {}", path.display()))
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_max_args() -> usize {
    DEFAULT_MAX_ARGS
}

fn default_config_file() -> String {
    DEFAULT_CONFIG_FILE.to_string()
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_limit(
    value: Option<String>,
    field: &'static str,
    default: usize,
) -> Result<usize, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.parse::<usize>() {
        Ok(limit) if limit >= 1 => Ok(limit),
        _ => Err(ConfigError::InvalidValue { field, value }),
    }
}
