use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_SOURCE_URL_ENV, DATA_SOURCE_URL_ENV, DEFAULT_CONFIG_PATH};
use crate::error::ConfigError;
use crate::types::SourceLocator;

/// Startup configuration, read once before the bootstrap runs
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub sources: SourcesConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
}

/// Where the locators of the data and config spreadsheets are published
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesConfig {
    pub data_source_url: String,
    #[serde(default)]
    pub config_source_url: Option<String>,
}

impl SourcesConfig {
    pub fn new(data_source_url: impl Into<String>, config_source_url: Option<String>) -> Self {
        Self {
            data_source_url: data_source_url.into(),
            config_source_url,
        }
    }

    pub fn data_source(&self) -> SourceLocator {
        SourceLocator::new(self.data_source_url.trim())
    }

    /// The secondary config-source locator, if one is declared and not blank
    pub fn config_source(&self) -> Option<SourceLocator> {
        self.config_source_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(SourceLocator::new)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Sheets published over HTTP as JSON arrays
    #[default]
    Http,
    /// Sheets exported to a local directory
    Static,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    #[serde(default)]
    pub kind: TransportKind,
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_bootstrap_timeout")]
    pub bootstrap_timeout_seconds: u64,
    #[serde(default)]
    pub static_root: Option<PathBuf>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::default(),
            timeout_seconds: default_request_timeout(),
            bootstrap_timeout_seconds: default_bootstrap_timeout(),
            static_root: None,
        }
    }
}

fn default_request_timeout() -> u64 {
    15
}

fn default_bootstrap_timeout() -> u64 {
    60
}

/// Routes the application shell knows how to render
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoutesConfig {
    #[serde(default)]
    pub known: Vec<String>,
}

impl Config {
    /// Load `config.toml` from the working directory and apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut config = Self::from_toml_str(&content)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Override source URLs from the environment (or any other lookup)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(DATA_SOURCE_URL_ENV) {
            self.sources.data_source_url = url;
        }
        if let Some(url) = lookup(CONFIG_SOURCE_URL_ENV) {
            self.sources.config_source_url = Some(url);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.data_source_url.trim().is_empty() {
            return Err(ConfigError::Missing("sources.data_source_url"));
        }
        if self.transport.kind == TransportKind::Static && self.transport.static_root.is_none() {
            return Err(ConfigError::Missing("transport.static_root"));
        }
        Ok(())
    }
}
