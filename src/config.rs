use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

pub const ENV_STORE_URL: &str = "REEF_STORE_URL";
pub const ENV_STORE_KEY: &str = "REEF_STORE_KEY";
pub const ENV_ADMIN_PASSWORD: &str = "REEF_ADMIN_PASSWORD";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the data service, e.g. `https://xyz.supabase.co`.
    pub store_url: Option<String>,

    /// Key sent as both `apikey` and bearer token.
    pub store_key: Option<String>,

    /// Shared secret for the login screen. Compared in cleartext; this is a
    /// convenience gate, not access control.
    pub admin_password: Option<String>,

    /// Unset means store calls wait indefinitely.
    pub request_timeout_secs: Option<u64>,

    /// File this config was read from, used in error messages.
    #[serde(skip)]
    pub(crate) source: Option<PathBuf>,
}

impl Config {
    /// Loads the config file (creating a default one if missing) and applies
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        let mut config = Self::load_from(&config_path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            toml::from_str::<Config>(&content)?
        } else {
            let config = Config::default();
            config.save_to(config_path)?;
            tracing::info!("Wrote default config to {}", config_path.display());
            config
        };
        config.source = Some(config_path.to_path_buf());
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_STORE_URL) {
            self.store_url = Some(url);
        }
        if let Some(key) = lookup(ENV_STORE_KEY) {
            self.store_key = Some(key);
        }
        if let Some(password) = lookup(ENV_ADMIN_PASSWORD) {
            self.admin_password = Some(password);
        }
    }

    pub fn store_url(&self) -> Result<&str> {
        self.store_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                let path = self.source.clone().unwrap_or_else(Self::config_path);
                AppError::Config(format!(
                    "store_url is not set (edit {} or set {ENV_STORE_URL})",
                    path.display()
                ))
            })
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("reef-admin")
            .join("config.toml")
    }
}
