//! Application bootstrap errors

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Could not determine config and data directories")]
    NoProjectDirs,

    #[error("Failed to read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    ParseConfig {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("No gateway token configured (set `token` or JTC_TOKEN)")]
    MissingToken,

    #[error("Failed to start runtime: {0}")]
    Runtime(std::io::Error),

    #[error(transparent)]
    Core(#[from] jtc_core::Error),

    #[error(transparent)]
    Gateway(#[from] jtc_net::Error),
}
