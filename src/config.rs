//! Run configuration.
//!
//! A single flat `config.toml` controls where the blog's inputs live and
//! where output goes. Every field has a default, so a fully conventional
//! layout needs no config file at all; CLI flags override individual fields
//! on top of whatever the file provides.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("config TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    /// Site title, used in page headers and the feed channel.
    pub title: String,
    /// Feed channel description.
    pub description: String,
    /// Absolute URL prefix for feed links, no trailing slash.
    pub base_url: String,
    /// JSON manifest describing all entries.
    pub manifest: PathBuf,
    /// Publication/modification-date ledger.
    pub ledger: PathBuf,
    /// Directory holding per-entry source files (`{lang}/{id}.html.source`).
    pub source_dir: PathBuf,
    /// Output directory for the generated site.
    pub output_dir: PathBuf,
}

impl Default for BlogConfig {
    fn default() -> Self {
        BlogConfig {
            title: "Blog".into(),
            description: String::new(),
            base_url: "https://localhost".into(),
            manifest: "blog.json".into(),
            ledger: "pubdates.json".into(),
            source_dir: "src".into(),
            output_dir: "dist".into(),
        }
    }
}

/// Load configuration from a `config.toml`, or defaults when `path` is
/// `None`. A named file must exist; only the unnamed default is optional.
pub fn load_config(path: Option<&Path>) -> Result<BlogConfig, ConfigError> {
    match path {
        Some(p) => {
            let content = std::fs::read_to_string(p)?;
            Ok(toml::from_str(&content)?)
        }
        None => Ok(BlogConfig::default()),
    }
}

/// A documented stock config with every option at its default, for
/// `simple-blog gen-config`.
pub fn stock_config_toml() -> String {
    r#"# simple-blog configuration
# Every option is shown at its default; delete what you don't change.

# Site title, used in page headers and the feed channel.
title = "Blog"

# Feed channel description.
description = ""

# Absolute URL prefix for feed links, no trailing slash.
base_url = "https://localhost"

# JSON manifest describing all entries.
manifest = "blog.json"

# Publication/modification-date ledger. Read at the start of a run,
# rewritten at the end. Keep it under version control.
ledger = "pubdates.json"

# Directory holding per-entry source files ({lang}/{id}.html.source).
source_dir = "src"

# Output directory for the generated site.
output_dir = "dist"
"#
    .to_string()
}
