use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Largest page the activity history endpoint serves.
pub const MAX_PAGE_SIZE: u32 = 250;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_attempts: {0}. Must be at least 1")]
    InvalidMaxAttempts(u32),

    #[error("Invalid page_size: {0}. Must be between 1 and 250")]
    InvalidPageSize(u32),

    #[error("Invalid {name}: {value}. Must be at least 1")]
    InvalidPageCap { name: &'static str, value: u32 },

    #[error("Invalid scheduler interval_secs: {0}. Must be at least 1")]
    InvalidInterval(u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid {table} role table: {reason}")]
    InvalidRoleMapping { table: &'static str, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .clearkeeper/config.yaml (project config)
    /// 3. .clearkeeper/local.yaml (local overrides, optional)
    /// 4. Environment variables (CLEARKEEPER_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(Path::new("."))
    }

    /// Same as [`ConfigLoader::load`] with `.clearkeeper/` resolved under `root`
    pub fn load_from_dir(root: &Path) -> Result<Config> {
        let config_dir = root.join(".clearkeeper");
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(config_dir.join("config.yaml")))
            .merge(Yaml::file(config_dir.join("local.yaml")))
            .merge(Env::prefixed("CLEARKEEPER_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("CLEARKEEPER_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// Secrets (API key, bot token) are not checked here; commands that need
    /// them fail when they build their clients.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(config.retry.max_attempts));
        }

        let pagination = &config.pagination;
        if pagination.page_size == 0 || pagination.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidPageSize(pagination.page_size));
        }
        if pagination.max_search_pages == 0 {
            return Err(ConfigError::InvalidPageCap {
                name: "max_search_pages",
                value: pagination.max_search_pages,
            });
        }
        if pagination.max_activity_pages == 0 {
            return Err(ConfigError::InvalidPageCap {
                name: "max_activity_pages",
                value: pagination.max_activity_pages,
            });
        }

        if config.scheduler.interval_secs == 0 {
            return Err(ConfigError::InvalidInterval(config.scheduler.interval_secs));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        config
            .roles
            .dungeon
            .validate()
            .map_err(|reason| ConfigError::InvalidRoleMapping {
                table: "dungeon",
                reason,
            })?;
        config
            .roles
            .raid
            .validate()
            .map_err(|reason| ConfigError::InvalidRoleMapping {
                table: "raid",
                reason,
            })?;

        if config.roles.always.iter().any(|role| role.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed(
                "always-granted role names cannot be empty".to_string(),
            ));
        }
        if let Some(role) = &config.roles.activity.role {
            if role.trim().is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "activity role name cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
