//! Application configuration.
//!
//! Configuration is stored in `.evcat/config.yaml` and includes:
//! - Backend base URL and request timeout
//! - Default page size and notification timeout
//! - Session cookies from the last login

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::list::pager::validate_page_size;
use crate::paths::config_file;
use crate::remote::Credentials;

pub const BASE_URL_ENV: &str = "EVCAT_BASE_URL";

/// Keys accepted by `config get` and `config set`
pub const CONFIG_KEYS: &[&str] = &[
    "base_url",
    "timeout_secs",
    "items_per_page",
    "notification_timeout_secs",
];

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_items_per_page() -> usize {
    10
}

fn default_notification_timeout_secs() -> u64 {
    3
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Backend root URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Total request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Default page size for list output (10, 20, 50 or 100)
    #[serde(default = "default_items_per_page")]
    pub items_per_page: usize,

    /// Seconds before a result notification closes itself; 0 keeps it open
    #[serde(default = "default_notification_timeout_secs")]
    pub notification_timeout_secs: u64,

    /// Session cookies saved by `evcat login`
    #[serde(default, skip_serializing_if = "Credentials::is_empty")]
    pub auth: Credentials,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            items_per_page: default_items_per_page(),
            notification_timeout_secs: default_notification_timeout_secs(),
            auth: Credentials::default(),
        }
    }
}

impl Config {
    pub fn config_path() -> PathBuf {
        config_file()
    }

    /// Load configuration from file, or return defaults if there is none.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            CatalogError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read config at {}: {e}", path.display()),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        validate_page_size(config.items_per_page)?;
        Ok(config)
    }

    /// Write configuration to file, readable by the owner only.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                CatalogError::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to create {}: {e}", parent.display()),
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content).map_err(|e| {
            CatalogError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to write config at {}: {e}", path.display()),
            ))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Base URL, with `EVCAT_BASE_URL` taking precedence over the file.
    pub fn base_url(&self) -> String {
        if let Ok(url) = env::var(BASE_URL_ENV)
            && !url.trim().is_empty()
        {
            return url.trim().to_string();
        }
        self.base_url.clone()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn notification_timeout(&self) -> Option<Duration> {
        (self.notification_timeout_secs > 0)
            .then(|| Duration::from_secs(self.notification_timeout_secs))
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.auth = credentials;
    }

    pub fn clear_credentials(&mut self) {
        self.auth = Credentials::default();
    }

    /// Read a setting by key.
    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "base_url" => Ok(self.base_url.clone()),
            "timeout_secs" => Ok(self.timeout_secs.to_string()),
            "items_per_page" => Ok(self.items_per_page.to_string()),
            "notification_timeout_secs" => Ok(self.notification_timeout_secs.to_string()),
            _ => Err(unknown_key(key)),
        }
    }

    /// Change a setting by key, validating the value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "base_url" => {
                url::Url::parse(value).map_err(|e| {
                    CatalogError::validation("base_url", format!("'{value}' is not a URL: {e}"))
                })?;
                self.base_url = value.trim_end_matches('/').to_string();
            }
            "timeout_secs" => {
                let secs = parse_number::<u64>(key, value)?;
                if secs == 0 {
                    return Err(CatalogError::validation(key, "must be greater than zero"));
                }
                self.timeout_secs = secs;
            }
            "items_per_page" => {
                self.items_per_page = validate_page_size(parse_number(key, value)?)?;
            }
            "notification_timeout_secs" => {
                self.notification_timeout_secs = parse_number(key, value)?;
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CatalogError::validation(key, format!("'{value}' is not a number")))
}

fn unknown_key(key: &str) -> CatalogError {
    CatalogError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}",
        CONFIG_KEYS.join(", ")
    ))
}
