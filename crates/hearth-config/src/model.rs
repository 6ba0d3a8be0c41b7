use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const MIN_START_DAY: u8 = 1;
pub const MAX_START_DAY: u8 = 28;
pub const SNAPSHOT_FILE_NAME: &str = "household.json";

/// User preferences shared by the CLI and the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_locale")]
    pub locale: String,
    #[serde(default = "Config::default_currency")]
    pub currency: String,
    /// Start day applied to users whose profile does not carry one.
    #[serde(default = "Config::default_start_day")]
    pub default_budget_start_day: u8,
    #[serde(default = "Config::default_precision")]
    pub currency_precision: u8,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    /// Custom snapshot location. Defaults to `<home>/data/household.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,
    /// Maximum number of period reports printed at once; `None` prints all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Self::default_locale(),
            currency: Self::default_currency(),
            default_budget_start_day: Self::default_start_day(),
            currency_precision: Self::default_precision(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            snapshot_path: None,
            report_limit: None,
        }
    }
}

impl Config {
    pub fn default_locale() -> String {
        "en-US".into()
    }

    pub fn default_currency() -> String {
        "USD".into()
    }

    pub fn default_start_day() -> u8 {
        MIN_START_DAY
    }

    pub fn default_precision() -> u8 {
        2
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    /// Start day clamped into the range every month can represent.
    pub fn budget_start_day(&self) -> u8 {
        self.default_budget_start_day
            .clamp(MIN_START_DAY, MAX_START_DAY)
    }

    pub fn set_budget_start_day(&mut self, day: u8) -> Result<(), ConfigError> {
        if !(MIN_START_DAY..=MAX_START_DAY).contains(&day) {
            return Err(ConfigError::Invalid(format!(
                "default budget start day must be between {MIN_START_DAY} and {MAX_START_DAY}, got {day}"
            )));
        }
        self.default_budget_start_day = day;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.currency.trim().is_empty() {
            return Err(ConfigError::Invalid("currency must not be empty".into()));
        }
        if self.currency_precision > 6 {
            return Err(ConfigError::Invalid(format!(
                "currency precision {} is out of range (0-6)",
                self.currency_precision
            )));
        }
        if self.report_limit == Some(0) {
            return Err(ConfigError::Invalid("report limit must be positive".into()));
        }
        Ok(())
    }

    pub fn resolve_snapshot_path(&self, home: &Path) -> PathBuf {
        match &self.snapshot_path {
            Some(path) => path.clone(),
            None => home.join("data").join(SNAPSHOT_FILE_NAME),
        }
    }

    /// `$HEARTH_HOME`, falling back to `~/.hearth`.
    pub fn default_home() -> PathBuf {
        if let Some(custom) = std::env::var_os("HEARTH_HOME").filter(|value| !value.is_empty()) {
            return PathBuf::from(custom);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hearth")
    }
}
