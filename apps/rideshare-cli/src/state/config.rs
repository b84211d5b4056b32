//! # Configuration State
//!
//! Application configuration loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`RIDESHARE_*`)
//! 2. Config file (`rideshare.toml`, or the `--config` path)
//! 3. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after loading, so no mutex is needed.

use directories::ProjectDirs;
use rideshare_core::{DurationModel, Money};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "rideshare.toml";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`AppConfig`].
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// An environment override could not be parsed.
    #[error("Invalid value for {var}: {reason}")]
    InvalidEnv { var: String, reason: String },

    /// A loaded value breaks a rule.
    #[error("Invalid configuration for '{key}': {reason}")]
    Invalid { key: String, reason: String },

    /// No platform directory could be determined.
    #[error("Could not determine the {0} directory")]
    NoProjectDir(&'static str),
}

/// Application configuration.
///
/// ## Example `rideshare.toml`
/// ```toml
/// database_path = "/tmp/rideshare.db"
/// currency_symbol = "R$"
/// duration_model = "average_speed"
/// seed_demo_data = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file. `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Currency symbol for display
    pub currency_symbol: String,

    /// Travel-time formula used by the estimator
    pub duration_model: DurationModel,

    /// Seed demo accounts and sample rides into an empty store
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    /// Defaults suitable for the demo: BRL, 3 min/km, seeded store.
    fn default() -> Self {
        AppConfig {
            database_path: None,
            currency_symbol: "R$".to_string(),
            duration_model: DurationModel::PerKilometre,
            seed_demo_data: true,
        }
    }
}

impl AppConfig {
    /// Loads configuration: defaults, then the config file, then the
    /// process environment, then validates.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    AppConfig::default()
                }
            },
        };

        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(path = %path.display(), "Loading configuration");
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies `RIDESHARE_*` overrides read through `lookup`.
    ///
    /// ## Environment Variables
    /// - `RIDESHARE_DB_PATH`: SQLite file path
    /// - `RIDESHARE_CURRENCY_SYMBOL`: display symbol
    /// - `RIDESHARE_DURATION_MODEL`: `per_kilometre` or `average_speed`
    /// - `RIDESHARE_SEED_DEMO_DATA`: `true` / `false`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("RIDESHARE_DB_PATH") {
            self.database_path = Some(PathBuf::from(path));
        }

        if let Some(symbol) = lookup("RIDESHARE_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }

        if let Some(model) = lookup("RIDESHARE_DURATION_MODEL") {
            self.duration_model = model.parse().map_err(|e| ConfigError::InvalidEnv {
                var: "RIDESHARE_DURATION_MODEL".to_string(),
                reason: format!("{}", e),
            })?;
        }

        if let Some(seed) = lookup("RIDESHARE_SEED_DEMO_DATA") {
            self.seed_demo_data = parse_bool(&seed).ok_or_else(|| ConfigError::InvalidEnv {
                var: "RIDESHARE_SEED_DEMO_DATA".to_string(),
                reason: format!("expected true or false, got '{}'", seed),
            })?;
        }

        Ok(())
    }

    /// Checks the loaded values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let symbol = self.currency_symbol.trim();
        if symbol.is_empty() || symbol.chars().count() > 4 {
            return Err(ConfigError::Invalid {
                key: "currency_symbol".to_string(),
                reason: "must be 1 to 4 characters".to_string(),
            });
        }

        if let Some(path) = &self.database_path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid {
                    key: "database_path".to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// The configured database path, or `rideshare.db` in the platform
    /// data directory.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.rideshare.demo/rideshare.db`
    /// - **Windows**: `%APPDATA%\rideshare\demo\data\rideshare.db`
    /// - **Linux**: `~/.local/share/demo/rideshare.db`
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let dirs = project_dirs().ok_or(ConfigError::NoProjectDir("data"))?;
        Ok(dirs.data_dir().join("rideshare.db"))
    }

    /// Formats an amount with the configured symbol.
    ///
    /// ## Example
    /// ```rust
    /// use rideshare_cli::state::AppConfig;
    /// use rideshare_core::Money;
    ///
    /// let config = AppConfig::default();
    /// assert_eq!(config.format_money(Money::from_cents(1234)), "R$12.34");
    /// assert_eq!(config.format_money(Money::from_cents(-1000)), "-R$10.00");
    /// ```
    pub fn format_money(&self, amount: Money) -> String {
        let cents = amount.cents();
        format!(
            "{}{}{}.{:02}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            (cents / 100).abs(),
            (cents % 100).abs()
        )
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "rideshare", "demo")
}

/// `rideshare.toml` in the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.currency_symbol, "R$");
        assert_eq!(config.duration_model, DurationModel::PerKilometre);
        assert!(config.seed_demo_data);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml("duration_model = \"average_speed\"\n").unwrap();
        assert_eq!(config.duration_model, DurationModel::AverageSpeed);
        assert_eq!(config.currency_symbol, "R$");
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_bad_toml_is_rejected() {
        assert!(AppConfig::from_toml("duration_model = \"warp\"").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = AppConfig::from_toml("currency_symbol = \"$\"").unwrap();
        config
            .apply_env(env(&[
                ("RIDESHARE_CURRENCY_SYMBOL", "US$"),
                ("RIDESHARE_SEED_DEMO_DATA", "false"),
                ("RIDESHARE_DB_PATH", "/tmp/x.db"),
            ]))
            .unwrap();

        assert_eq!(config.currency_symbol, "US$");
        assert!(!config.seed_demo_data);
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn test_invalid_env_values() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(env(&[("RIDESHARE_SEED_DEMO_DATA", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));

        let err = config
            .apply_env(env(&[("RIDESHARE_DURATION_MODEL", "teleport")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn test_validate_currency_symbol() {
        let config = AppConfig {
            currency_symbol: "  ".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_format_money() {
        let config = AppConfig {
            currency_symbol: "$".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.format_money(Money::from_cents(450)), "$4.50");
        assert_eq!(config.format_money(Money::from_cents(0)), "$0.00");
        assert_eq!(config.format_money(Money::from_cents(-5)), "-$0.05");
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let path = std::env::temp_dir().join(format!("missing-{}.toml", uuid::Uuid::new_v4()));
        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::Read { .. })
        ));
    }
}
