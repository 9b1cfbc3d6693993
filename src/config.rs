// 7.0 config.rs: all settings in one place. liquidation thresholds and history storage.
// 7.1 loaded from JSON when a path is given, otherwise defaults.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::history::DEFAULT_STORAGE_KEY;
use crate::liquidation::LiquidationParams;

/** 7.2: where saved calculations go. no directory = in-memory only */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    // Key the whole history array is stored under
    pub storage_key: String,
    // Directory for the file-backed store
    pub directory: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            directory: None,
        }
    }
}

// The complete calculator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeMathConfig {
    pub liquidation: LiquidationParams,
    pub history: HistoryConfig,
}

impl TradeMathConfig {
    // Parse and validate a JSON document. missing sections fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    // Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let liq = &self.liquidation;

        // isolated threshold is a share of margin, so (0, 1]
        if liq.isolated_loss_threshold <= Decimal::ZERO || liq.isolated_loss_threshold > Decimal::ONE {
            return Err(ConfigError::InvalidLiquidation {
                reason: "isolated loss threshold must be in (0, 1]".to_string(),
            });
        }

        if liq.max_roe_at_stop_percent <= Decimal::ZERO {
            return Err(ConfigError::InvalidLiquidation {
                reason: "max ROE at stop must be positive".to_string(),
            });
        }

        if liq.min_safe_leverage < Decimal::ONE {
            return Err(ConfigError::InvalidLiquidation {
                reason: "min safe leverage must be at least 1x".to_string(),
            });
        }

        let key = &self.history.storage_key;
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(ConfigError::InvalidHistory {
                reason: format!("storage key {key:?} must be non-empty [A-Za-z0-9_-]"),
            });
        }

        Ok(())
    }
}

// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid liquidation params: {reason}")]
    InvalidLiquidation { reason: String },

    #[error("Invalid history config: {reason}")]
    InvalidHistory { reason: String },

    #[error("Cannot parse config: {reason}")]
    Parse { reason: String },

    #[error("Cannot read config {path:?}: {reason}")]
    Read { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config_valid() {
        let config = TradeMathConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history.storage_key, "crypto_futures_trademath_history");
        assert_eq!(config.liquidation.isolated_loss_threshold, dec!(0.9));
    }

    #[test]
    fn test_invalid_threshold() {
        let mut config = TradeMathConfig::default();
        config.liquidation.isolated_loss_threshold = dec!(1.1);

        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::InvalidLiquidation { .. })));
    }

    #[test]
    fn test_invalid_min_leverage() {
        let mut config = TradeMathConfig::default();
        config.liquidation.min_safe_leverage = dec!(0.5);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLiquidation { .. })));
    }

    #[test]
    fn test_invalid_storage_key() {
        let mut config = TradeMathConfig::default();
        config.history.storage_key = "../history".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidHistory { .. })));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TradeMathConfig::from_json(r#"{"history": {"directory": "/tmp/trademath"}}"#).unwrap();
        assert_eq!(config.history.directory, Some(PathBuf::from("/tmp/trademath")));
        assert_eq!(config.history.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.liquidation, LiquidationParams::default());
    }

    #[test]
    fn test_thresholds_from_json_numbers() {
        let config = TradeMathConfig::from_json(r#"{"liquidation": {"isolated_loss_threshold": 0.8}}"#).unwrap();
        assert_eq!(config.liquidation.isolated_loss_threshold, dec!(0.8));
        assert_eq!(config.liquidation.max_roe_at_stop_percent, dec!(90));
    }

    #[test]
    fn test_bad_json_rejected() {
        assert!(matches!(TradeMathConfig::from_json("{"), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trademath.json");
        let config = TradeMathConfig::default();
        fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        assert_eq!(TradeMathConfig::load(&path).unwrap(), config);
        assert!(matches!(
            TradeMathConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));
    }
}
