use anyhow::{Context, Result};
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::budget::{DEFAULT_DAILY_KCAL, DEFAULT_WEEKLY_KCAL, MIN_DAILY_KCAL, MIN_WEEKLY_KCAL};
use crate::calculator::DEFAULT_KCAL_PER_EXERCISE_MINUTE;

/// Application configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub calculator: CalculatorConfig,
    pub budget: BudgetConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: String,
    pub flush_on_write: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    pub format: String, // "json" or "text"
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    pub kcal_per_exercise_minute: f64,
}

/// Budget used until the user saves their own settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetConfig {
    pub daily_kcal: u32,
    pub weekly_kcal: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    pub max_results: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                path: "data/teacal.sled".to_string(),
                flush_on_write: true,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            calculator: CalculatorConfig {
                kcal_per_exercise_minute: DEFAULT_KCAL_PER_EXERCISE_MINUTE,
            },
            budget: BudgetConfig {
                daily_kcal: DEFAULT_DAILY_KCAL,
                weekly_kcal: DEFAULT_WEEKLY_KCAL,
            },
            search: SearchConfig {
                debounce_ms: 300,
                max_results: 10,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        Self::load_from(
            ["config/default", "config/local", "config"],
            Environment::with_prefix("TEACAL").separator("__"),
        )
    }

    /// Load defaults, then each optional file in order, then `env`
    pub fn load_from<'a, I>(files: I, env: Environment) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut builder = Self::default()
            .flatten()
            .into_iter()
            .try_fold(Config::builder(), |builder, (key, value)| {
                builder.set_default(key, value)
            })
            .context("Failed to set configuration defaults")?;

        for name in files {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        let app_config: Self = Self::build(builder.add_source(env))?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.storage.path.trim().is_empty() {
            anyhow::bail!("storage.path must not be empty");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            );
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            );
        }

        let rate = self.calculator.kcal_per_exercise_minute;
        if !rate.is_finite() || rate <= 0.0 {
            anyhow::bail!("kcal_per_exercise_minute must be greater than 0");
        }

        if self.budget.daily_kcal < MIN_DAILY_KCAL {
            anyhow::bail!("budget.daily_kcal must be at least {MIN_DAILY_KCAL}");
        }
        if self.budget.weekly_kcal < MIN_WEEKLY_KCAL {
            anyhow::bail!("budget.weekly_kcal must be at least {MIN_WEEKLY_KCAL}");
        }

        if self.search.debounce_ms == 0 {
            anyhow::bail!("debounce_ms must be greater than 0");
        }
        if self.search.max_results == 0 {
            anyhow::bail!("max_results must be greater than 0");
        }

        Ok(())
    }

    /// Get storage path from environment or config
    pub fn get_storage_path(&self) -> PathBuf {
        std::env::var("TEACAL_STORAGE_PATH")
            .map_or_else(|_| PathBuf::from(&self.storage.path), PathBuf::from)
    }

    /// Get log level from environment or config
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }

    /// Effective configuration as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to render configuration")
    }

    // Flatten the configuration into key-value pairs
    fn flatten(self) -> Vec<(&'static str, config::Value)> {
        let mut pairs = vec![
            ("storage.path", config::Value::from(self.storage.path)),
            ("storage.flush_on_write", config::Value::from(self.storage.flush_on_write)),
            ("logging.level", config::Value::from(self.logging.level)),
            ("logging.format", config::Value::from(self.logging.format)),
            (
                "calculator.kcal_per_exercise_minute",
                config::Value::from(self.calculator.kcal_per_exercise_minute),
            ),
            ("budget.daily_kcal", config::Value::from(self.budget.daily_kcal)),
            ("budget.weekly_kcal", config::Value::from(self.budget.weekly_kcal)),
            ("search.debounce_ms", config::Value::from(self.search.debounce_ms)),
            ("search.max_results", config::Value::from(self.search.max_results as u64)),
        ];
        if let Some(file_path) = self.logging.file_path {
            pairs.push(("logging.file_path", config::Value::from(file_path)));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.storage.path, "data/teacal.sled");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.budget.daily_kcal, 300);
        assert_eq!(config.search.debounce_ms, 300);
    }

    #[test]
    fn test_config_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = AppConfig::default();
        config.search.max_results = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.budget.daily_kcal = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_defaults_survive_layering() {
        let config = AppConfig::load_from(
            std::iter::empty::<&str>(),
            Environment::with_prefix("TEACAL_UNIT_UNUSED").separator("__"),
        )
        .unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_yaml_contains_sections() {
        let yaml = AppConfig::default().to_yaml().unwrap();
        assert!(yaml.contains("storage:"));
        assert!(yaml.contains("debounce_ms: 300"));
    }
}
