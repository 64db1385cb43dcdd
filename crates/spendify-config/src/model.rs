use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use spendify_domain::{AggregationPeriod, PaymentMethod};

use crate::ConfigError;

/// Stores user-configurable app preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub locale: String,
    pub currency_symbol: String,
    /// Offset from UTC used to decide what "today" is.
    #[serde(default = "Config::default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    #[serde(default = "Config::default_period_value")]
    pub default_period: AggregationPeriod,
    #[serde(default)]
    pub default_payment_method: PaymentMethod,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    /// Starts the shell with the network marked offline.
    #[serde(default)]
    pub offline_mode: bool,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    /// Optional custom directory for the backend tables. Defaults to `<home>/data`.
    pub data_root: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    /// Optional custom directory for backups. Defaults to `<home>/backups`.
    pub backup_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-IN".into(),
            currency_symbol: "₹".into(),
            utc_offset_minutes: Self::default_utc_offset_minutes(),
            default_period: Self::default_period_value(),
            default_payment_method: PaymentMethod::default(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            offline_mode: false,
            backup_retention: Self::default_backup_retention(),
            data_root: None,
            backup_root: None,
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 10] = [
        "locale",
        "currency_symbol",
        "utc_offset_minutes",
        "default_period",
        "default_payment_method",
        "ui_color_enabled",
        "offline_mode",
        "backup_retention",
        "data_root",
        "backup_root",
    ];

    pub fn default_utc_offset_minutes() -> i32 {
        330
    }

    pub fn default_period_value() -> AggregationPeriod {
        AggregationPeriod::Day
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn resolve_data_root(&self, home: &Path) -> PathBuf {
        self.data_root
            .clone()
            .unwrap_or_else(|| home.join("data"))
    }

    pub fn resolve_backup_root(&self, home: &Path) -> PathBuf {
        self.backup_root
            .clone()
            .unwrap_or_else(|| home.join("backups"))
    }

    /// Renders a single setting for display.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key.trim() {
            "locale" => self.locale.clone(),
            "currency_symbol" => self.currency_symbol.clone(),
            "utc_offset_minutes" => self.utc_offset_minutes.to_string(),
            "default_period" => self.default_period.to_string(),
            "default_payment_method" => self.default_payment_method.to_string(),
            "ui_color_enabled" => self.ui_color_enabled.to_string(),
            "offline_mode" => self.offline_mode.to_string(),
            "backup_retention" => self.backup_retention.to_string(),
            "data_root" => display_path(self.data_root.as_deref()),
            "backup_root" => display_path(self.backup_root.as_deref()),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Parses `value` and assigns it to `key`. `default` or an empty value
    /// resets optional paths.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let key = key.trim();
        let raw = value.trim();
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: key.to_string(),
            reason,
        };
        match key {
            "locale" => {
                if raw.is_empty() {
                    return Err(invalid("locale cannot be empty".into()));
                }
                self.locale = raw.to_string();
            }
            "currency_symbol" => {
                if raw.is_empty() {
                    return Err(invalid("currency symbol cannot be empty".into()));
                }
                self.currency_symbol = raw.to_string();
            }
            "utc_offset_minutes" => {
                let minutes: i32 = raw
                    .parse()
                    .map_err(|_| invalid(format!("`{raw}` is not a number")))?;
                if !(-14 * 60..=14 * 60).contains(&minutes) {
                    return Err(invalid("offset must be within ±14 hours".into()));
                }
                self.utc_offset_minutes = minutes;
            }
            "default_period" => {
                self.default_period = raw.parse().map_err(|err| invalid(format!("{err}")))?;
            }
            "default_payment_method" => {
                self.default_payment_method =
                    raw.parse().map_err(|err| invalid(format!("{err}")))?;
            }
            "ui_color_enabled" => {
                self.ui_color_enabled =
                    parse_bool(raw).ok_or_else(|| invalid(format!("`{raw}` is not on/off")))?;
            }
            "offline_mode" => {
                self.offline_mode =
                    parse_bool(raw).ok_or_else(|| invalid(format!("`{raw}` is not on/off")))?;
            }
            "backup_retention" => {
                let count: usize = raw
                    .parse()
                    .map_err(|_| invalid(format!("`{raw}` is not a number")))?;
                if count == 0 {
                    return Err(invalid("keep at least one backup".into()));
                }
                self.backup_retention = count;
            }
            "data_root" => self.data_root = parse_path(raw),
            "backup_root" => self.backup_root = parse_path(raw),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn parse_path(raw: &str) -> Option<PathBuf> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("default") {
        None
    } else {
        Some(PathBuf::from(raw))
    }
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|path| path.display().to_string())
        .unwrap_or_else(|| "(default)".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_parses_typed_values() {
        let mut cfg = Config::default();
        cfg.set("default_period", "Month").unwrap();
        cfg.set("ui_color_enabled", "off").unwrap();
        cfg.set("default_payment_method", "cash").unwrap();
        assert_eq!(cfg.default_period, AggregationPeriod::Month);
        assert!(!cfg.ui_color_enabled);
        assert_eq!(cfg.get("default_payment_method").unwrap(), "cash");
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("backup_retention", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("utc_offset_minutes", "5000"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(cfg.set("theme", "dark"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn paths_fall_back_to_home() {
        let mut cfg = Config::default();
        let home = Path::new("/tmp/spendify-home");
        assert_eq!(cfg.resolve_data_root(home), home.join("data"));
        cfg.set("data_root", "/srv/data").unwrap();
        assert_eq!(cfg.resolve_data_root(home), PathBuf::from("/srv/data"));
        cfg.set("data_root", "default").unwrap();
        assert!(cfg.data_root.is_none());
    }

    #[test]
    fn every_key_is_readable() {
        let cfg = Config::default();
        for key in Config::KEYS {
            assert!(cfg.get(key).is_ok(), "{key} should be readable");
        }
    }
}
