//! Runtime configuration
//!
//! Read from `JTC_CONFIG` or `<config_dir>/jtc.toml`. Every field is optional
//! except the gateway token, which may also come from `JTC_TOKEN`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use jtc_core::DEFAULT_ROOM_NAME_TEMPLATE;
use serde::Deserialize;

use crate::error::{AppError, Result};

const CONFIG_ENV: &str = "JTC_CONFIG";
const TOKEN_ENV: &str = "JTC_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub gateway_addr: String,
    /// Defaults to `<data_dir>/jtc.db`
    pub database_path: Option<PathBuf>,
    pub room_name_template: String,
    pub max_in_flight: usize,
    pub request_timeout_secs: u64,
    pub token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway_addr: format!("127.0.0.1:{}", jtc_net::DEFAULT_PORT),
            database_path: None,
            room_name_template: DEFAULT_ROOM_NAME_TEMPLATE.to_string(),
            max_in_flight: 32,
            request_timeout_secs: 10,
            token: None,
        }
    }
}

impl Config {
    /// Load configuration from the environment and the config file
    pub fn load() -> Result<Self> {
        let dirs = project_dirs();
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => dirs.as_ref().map(|d| d.config_dir().join("jtc.toml")),
        };

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                tracing::info!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        if let Ok(token) = std::env::var(TOKEN_ENV) {
            config.token = Some(token);
        }
        if config.database_path.is_none() {
            let dirs = dirs.ok_or(AppError::NoProjectDirs)?;
            config.database_path = Some(dirs.data_dir().join("jtc.db"));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| AppError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| AppError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(AppError::MissingToken);
        }
        if self.max_in_flight == 0 {
            return Err(AppError::InvalidConfig(
                "max_in_flight must be at least 1".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::InvalidConfig(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        if !self.room_name_template.contains("{name}") {
            tracing::warn!(
                template = %self.room_name_template,
                "Room name template has no {{name}} placeholder"
            );
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Token after validation; empty if `validate` was skipped
    pub fn token(&self) -> &str {
        self.token.as_deref().unwrap_or_default()
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "jtc", "jtc")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.room_name_template, "{name}'s Channel");
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse(
            r#"
            gateway_addr = "10.0.0.2:9000"
            max_in_flight = 4
            token = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.gateway_addr, "10.0.0.2:9000");
        assert_eq!(config.max_in_flight, 4);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Config::parse("gatway_addr = \"x\"").is_err());
    }

    #[test]
    fn test_missing_token_rejected() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(AppError::MissingToken)));

        let config = Config {
            token: Some("  ".into()),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(AppError::MissingToken)));
    }

    #[test]
    fn test_zero_limits_rejected() {
        let config = Config {
            token: Some("t".into()),
            max_in_flight: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AppError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jtc.toml");
        std::fs::write(&path, "room_name_template = \"{name} hangout\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.room_name_template, "{name} hangout");

        let missing = Config::from_file(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(AppError::ReadConfig { .. })));
    }
}
