use serde::{de::Deserializer, Deserialize, Serialize};
use serde_json::Value;
use std::{env, path::PathBuf};

use crate::ConfigError;

/// Environment variable that overrides every other data directory setting.
pub const DATA_HOME_ENV: &str = "SHOPBOOK_HOME";

/// Shop-wide settings persisted next to the books.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "Config::default_currency")]
    pub currency: String,
    #[serde(default)]
    pub business_name: String,
    /// Percentage of investor-owned profit paid to the investor.
    #[serde(
        default = "Config::default_investor_share",
        deserialize_with = "lenient_share"
    )]
    pub investor_share: f64,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for the book file and its backups.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: Self::default_currency(),
            business_name: String::new(),
            investor_share: Self::default_investor_share(),
            backup_retention: Self::default_backup_retention(),
            data_root: None,
        }
    }
}

impl Config {
    pub fn default_currency() -> String {
        "COP".into()
    }

    pub fn default_investor_share() -> f64 {
        50.0
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    /// `investor_share` clamped to `0..=100`.
    pub fn investor_share_percent(&self) -> f64 {
        if self.investor_share.is_finite() {
            self.investor_share.clamp(0.0, 100.0)
        } else {
            Self::default_investor_share()
        }
    }

    /// Keys accepted by [`Config::set`].
    pub const SETTINGS: [&'static str; 5] = [
        "business_name",
        "currency",
        "investor_share",
        "backup_retention",
        "data_root",
    ];

    /// Applies one textual setting, as typed on the command line.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let value = value.trim();
        match key {
            "business_name" => self.business_name = value.to_string(),
            "currency" if value.len() == 3 && value.chars().all(|c| c.is_ascii_alphabetic()) => {
                self.currency = value.to_ascii_uppercase()
            }
            "currency" => return Err(invalid()),
            "investor_share" => {
                let share = value
                    .trim_end_matches('%')
                    .parse::<f64>()
                    .ok()
                    .filter(|share| (0.0..=100.0).contains(share))
                    .ok_or_else(invalid)?;
                self.investor_share = share;
            }
            "backup_retention" => {
                self.backup_retention = value
                    .parse::<usize>()
                    .ok()
                    .filter(|keep| *keep > 0)
                    .ok_or_else(invalid)?;
            }
            "data_root" => {
                self.data_root = (!value.is_empty() && value != "-").then(|| PathBuf::from(value))
            }
            other => return Err(ConfigError::UnknownSetting(other.to_string())),
        }
        Ok(())
    }

    /// `$SHOPBOOK_HOME`, then `data_root`, then the platform data directory.
    pub fn resolve_data_root(&self) -> PathBuf {
        self.resolve_data_root_with(env::var_os(DATA_HOME_ENV).map(PathBuf::from))
    }

    pub fn resolve_data_root_with(&self, override_root: Option<PathBuf>) -> PathBuf {
        if let Some(path) = override_root.filter(|path| !path.as_os_str().is_empty()) {
            return path;
        }
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("shopbook")
    }
}

fn lenient_share<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let share = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(share
        .filter(|share| share.is_finite())
        .unwrap_or_else(Config::default_investor_share))
}
