//! Provider configuration
//!
//! Loaded from YAML, then adjusted by environment overrides:
//! - `SWARK_PACKAGE_ROOT` - directory behind `swark:` locators
//! - `SWARK_HTTP_TIMEOUT` - network timeout in seconds

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const PACKAGE_ROOT_ENV: &str = "SWARK_PACKAGE_ROOT";
pub const HTTP_TIMEOUT_ENV: &str = "SWARK_HTTP_TIMEOUT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Root of `swark:` paths; defaults to the crate's `data/` directory
    #[serde(default)]
    pub package_root: Option<PathBuf>,

    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_http_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("swark/{}", env!("CARGO_PKG_VERSION"))
}

/// Data directory shipped with this crate
#[must_use]
pub fn default_package_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            package_root: None,
            http_timeout_secs: default_http_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ProviderConfig {
    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(PACKAGE_ROOT_ENV).filter(|v| !v.trim().is_empty()) {
            self.package_root = Some(PathBuf::from(root));
        }
        if let Some(timeout) = lookup(HTTP_TIMEOUT_ENV) {
            self.http_timeout_secs = timeout.trim().parse().map_err(|_| {
                Error::Config(format!("{HTTP_TIMEOUT_ENV} must be a number of seconds, got '{timeout}'"))
            })?;
        }
        validate_config(self)
    }

    /// The effective package root
    #[must_use]
    pub fn package_root(&self) -> PathBuf {
        self.package_root
            .clone()
            .unwrap_or_else(default_package_root)
    }
}

/// Load configuration from YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ProviderConfig> {
    let content = std::fs::read_to_string(&path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file {}: {e}",
            path.as_ref().display()
        ))
    })?;

    let config: ProviderConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse YAML configuration: {e}")))?;

    validate_config(&config)?;
    Ok(config)
}

/// Validate configuration
pub(crate) fn validate_config(config: &ProviderConfig) -> Result<()> {
    if config.http_timeout_secs == 0 {
        return Err(Error::Config(
            "http_timeout_secs must be greater than 0".to_string(),
        ));
    }
    if config
        .package_root
        .as_ref()
        .is_some_and(|root| root.as_os_str().is_empty())
    {
        return Err(Error::Config("package_root cannot be empty".to_string()));
    }
    if config.user_agent.trim().is_empty() {
        return Err(Error::Config("user_agent cannot be empty".to_string()));
    }
    Ok(())
}
