//! Application configuration management.
//!
//! Configuration is stored at `~/.config/zmanym/config.json` (platform
//! equivalent via `dirs`). Every field has a default, so a missing file or a
//! partial one is fine. A few values can be overridden from the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::{
    DEFAULT_API_BASE_URL, DEFAULT_GEOCODE_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::location::SupportedRegion;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "zmanym";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_API_BASE_URL: &str = "ZMANYM_API_BASE_URL";
pub const ENV_REGION: &str = "ZMANYM_REGION";
pub const ENV_REGION_COUNTRY: &str = "ZMANYM_REGION_COUNTRY";
pub const ENV_CACHE_DIR: &str = "ZMANYM_CACHE_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub geocode_base_url: String,
    pub request_timeout_secs: u64,
    pub region_code: String,
    pub region_country: String,
    pub cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let region = SupportedRegion::default();
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            geocode_base_url: DEFAULT_GEOCODE_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            region_code: region.code,
            region_country: region.country_name,
            cache_dir: None,
        }
    }
}

impl Config {
    /// Load from the default path, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply overrides from `lookup` (the process environment in production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = url;
        }
        if let Some(code) = lookup(ENV_REGION) {
            let code = code.trim().to_uppercase();
            if code != self.region_code {
                // The configured country name belongs to the old code
                self.region_country = code.clone();
                self.region_code = code;
            }
        }
        if let Some(country) = lookup(ENV_REGION_COUNTRY) {
            self.region_country = country.trim().to_string();
        }
        if let Some(dir) = lookup(ENV_CACHE_DIR) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn region(&self) -> SupportedRegion {
        SupportedRegion::new(&self.region_code, &self.region_country)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_base_url, "https://www.hebcal.com");
        assert_eq!(config.region(), SupportedRegion::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"region_code": "IL", "region_country": "Israel"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.region(), SupportedRegion::new("IL", "Israel"));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            cache_dir: Some(PathBuf::from("/tmp/zmanym-cache")),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
        assert_eq!(config.cache_dir().unwrap(), PathBuf::from("/tmp/zmanym-cache"));
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_API_BASE_URL, "http://localhost:8080"),
            (ENV_REGION, " il "),
            (ENV_CACHE_DIR, ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.region_code, "IL");
        // Empty values are ignored
        assert_eq!(config.cache_dir, None);
    }

    #[test]
    fn test_region_override_replaces_country() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == ENV_REGION).then(|| "IL".to_string()));
        let region = config.region();
        assert_eq!(region, SupportedRegion::new("IL", "IL"));

        let us_record = serde_json::json!({ "cc": "US", "country": "United States" });
        assert!(!region.contains(us_record.as_object().unwrap()));
        let il_record = serde_json::json!({ "cc": "IL" });
        assert!(region.contains(il_record.as_object().unwrap()));

        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            ENV_REGION => Some("il".to_string()),
            ENV_REGION_COUNTRY => Some("Israel".to_string()),
            _ => None,
        });
        assert_eq!(config.region(), SupportedRegion::new("IL", "Israel"));

        // Same code keeps the configured name
        let mut config = Config::default();
        config.apply_overrides(|key| (key == ENV_REGION).then(|| "us".to_string()));
        assert_eq!(config.region(), SupportedRegion::default());
    }
}
