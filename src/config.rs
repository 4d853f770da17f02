use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::http::Endpoint;
use crate::shell::APP_ELEMENT_ID;
use crate::units::Units;

pub const GEOLOCATION_KEY_ENV: &str = "IPGEOLOCATION_API_KEY";
pub const WEATHER_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const MIN_REFRESH_SECS: u64 = 60;

const APP_DIR: &str = "geowx";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub units: Units,

    /// Seconds between automatic refetches.
    pub refresh_secs: u64,

    /// Id of the host element the application mounts into.
    pub host_id: String,

    pub geolocation: ServiceConfig,
    pub weather: ServiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ServiceConfig {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.base_url.clone(), self.api_key.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            units: Units::default(),
            refresh_secs: 600,
            host_id: APP_ELEMENT_ID.to_string(),
            geolocation: ServiceConfig {
                base_url: "https://api.ipgeolocation.io".to_string(),
                api_key: None,
            },
            weather: ServiceConfig {
                base_url: "https://api.openweathermap.org".to_string(),
                api_key: None,
            },
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join(APP_DIR)
            .join("config.toml"))
    }

    /// Read `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(io_err)?;
        log::info!("saved config to {}", path.display());
        Ok(())
    }

    /// Fill missing API keys from the environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (service, var) in [
            (&mut self.geolocation, GEOLOCATION_KEY_ENV),
            (&mut self.weather, WEATHER_KEY_ENV),
        ] {
            if let Some(key) = lookup(var).filter(|k| !k.is_empty()) {
                service.api_key = Some(key);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_secs < MIN_REFRESH_SECS {
            return Err(ConfigError::RefreshTooShort {
                min: MIN_REFRESH_SECS,
                got: self.refresh_secs,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.host_id, "app");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.units = Units::Imperial;
        config.weather.api_key = Some("owm-key".into());
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "units = \"imperial\"\nrefresh_secs = 120\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.units, Units::Imperial);
        assert_eq!(config.refresh_secs, 120);
        assert_eq!(config.weather, Config::default().weather);
    }

    #[test]
    fn test_bad_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "units = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_env_fills_keys() {
        let mut config = Config::default();
        config.geolocation.api_key = Some("from-file".into());
        config.apply_env_with(|name| match name {
            WEATHER_KEY_ENV => Some("from-env".into()),
            GEOLOCATION_KEY_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.weather.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.geolocation.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_validate_refresh() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        config.refresh_secs = 5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RefreshTooShort { min: 60, got: 5 })
        ));
    }
}
