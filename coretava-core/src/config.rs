//! Client configuration, loaded from TOML with environment overrides.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_URL: &str = "CORETAVA_API_URL";
pub const ENV_APP_ID_HEADER: &str = "CORETAVA_APP_ID_HEADER";
pub const ENV_RETAIL_APP_ID: &str = "CORETAVA_RETAIL_APP_ID";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CoretavaConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Header carrying the Coretava app id on every request.
    #[serde(default = "default_app_id_header")]
    pub app_id_header: String,
    /// Storefront account the events are attributed to.
    #[serde(default)]
    pub retail_app_id: String,
    /// Fraction of the element area that must be inside the viewport.
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f64,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IdentityConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_lifetime_years")]
    pub lifetime_years: u32,
    /// Where the file cookie store lives; `None` keeps the id in memory.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

fn default_api_url() -> String {
    "https://api.staging.coretava.com".to_string()
}

fn default_app_id_header() -> String {
    "gamix-app-id".to_string()
}

fn default_visibility_threshold() -> f64 {
    0.5
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_cookie_name() -> String {
    "_gamiphy_cid".to_string()
}

fn default_lifetime_years() -> u32 {
    2
}

impl Default for CoretavaConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            app_id_header: default_app_id_header(),
            retail_app_id: String::new(),
            visibility_threshold: default_visibility_threshold(),
            request_timeout_ms: default_request_timeout_ms(),
            identity: IdentityConfig::default(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            lifetime_years: default_lifetime_years(),
            store_path: None,
        }
    }
}

impl CoretavaConfig {
    /// Read, apply environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        tracing::debug!(api_url = %config.api_url, "loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Override fields from `lookup`; empty values are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(header) = lookup(ENV_APP_ID_HEADER) {
            self.app_id_header = header;
        }
        if let Some(retail) = lookup(ENV_RETAIL_APP_ID) {
            self.retail_app_id = retail;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "api_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.app_id_header.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "app_id_header",
                reason: "must not be empty".to_string(),
            });
        }
        let t = self.visibility_threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "visibility_threshold",
                reason: format!("{t} is outside (0, 1]"),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
