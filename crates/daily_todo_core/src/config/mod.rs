use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR_NAME: &str = "daily_todo";
const CONFIG_FILE_NAME: &str = "config.json";
const STORE_FILE_NAME: &str = "users.json";
const CONFIG_ENV_VAR: &str = "DAILY_TODO_CONFIG_PATH";
const STORE_ENV_VAR: &str = "DAILY_TODO_STORE_PATH";

pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    pub reject_inverted_range: bool,
    #[serde(default)]
    pub lock_timeout_ms: Option<u64>,
    /// Store path given on the command line; outranks the environment.
    #[serde(skip)]
    pub store_path_override: Option<PathBuf>,
}

impl Config {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms.unwrap_or(DEFAULT_LOCK_TIMEOUT_MS))
    }

    pub fn range_policy(&self) -> RangePolicy {
        if self.reject_inverted_range {
            RangePolicy::RejectInverted
        } else {
            RangePolicy::AllowInverted
        }
    }
}

/// Whether a task may end before it starts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RangePolicy {
    #[default]
    AllowInverted,
    RejectInverted,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub store_path: Option<PathBuf>,
    pub reject_inverted_range: Option<bool>,
    pub lock_timeout_ms: Option<u64>,
}

fn app_dir() -> Result<PathBuf, AppError> {
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join(APP_DIR_NAME))
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    match std::env::var(name) {
        Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
        _ => None,
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Some(path) = env_path(CONFIG_ENV_VAR) {
        return Ok(path);
    }
    Ok(app_dir()?.join(CONFIG_FILE_NAME))
}

/// Command-line override first, then the environment, then the config file,
/// then the per-user default.
pub fn store_path(config: &Config) -> Result<PathBuf, AppError> {
    if let Some(path) = config.store_path_override.as_ref() {
        return Ok(path.clone());
    }
    if let Some(path) = env_path(STORE_ENV_VAR) {
        return Ok(path);
    }
    if let Some(path) = config.store_path.as_ref() {
        return Ok(path.clone());
    }
    Ok(app_dir()?.join(STORE_FILE_NAME))
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable config");
            ConfigLoad {
                config: Config::default(),
                error: Some(err),
            }
        }
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::invalid_data(format!("{}: {}", path.display(), err)))?;
    serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(path) = overrides.store_path.as_ref() {
        merged.store_path_override = Some(path.clone());
    }
    if let Some(reject) = overrides.reject_inverted_range {
        merged.reject_inverted_range = reject;
    }
    if let Some(timeout) = overrides.lock_timeout_ms {
        merged.lock_timeout_ms = Some(timeout);
    }
    merged
}
