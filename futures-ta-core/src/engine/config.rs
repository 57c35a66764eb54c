//! Engine configuration: the tunable thresholds of the signal engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::indicators::PsarParams;

/// Errors from loading or validating an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parse engine config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid engine config: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Thresholds used by the signal engine.
///
/// Every field has a default, so a TOML file only needs the keys it wants to
/// override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Stop distance = multiplier * ATR14.
    pub atr_stop_multiplier: f64,
    /// Rows needed before `quality.ok` is true.
    pub min_rows_required: usize,
    pub adx_trend_threshold: f64,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    /// Bollinger bandwidth growth vs the previous bar that counts as expansion.
    pub bw_expand_ratio: f64,
    /// Bollinger bandwidth shrink vs the previous bar that counts as contraction.
    pub bw_contract_ratio: f64,
    pub psar: PsarParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            atr_stop_multiplier: 2.5,
            min_rows_required: 60,
            adx_trend_threshold: 25.0,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            bw_expand_ratio: 1.05,
            bw_contract_ratio: 0.95,
            psar: PsarParams::default(),
        }
    }
}

impl EngineConfig {
    /// Parse from TOML and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: String| Err(ConfigError::Invalid { field, reason });

        if !(self.atr_stop_multiplier.is_finite() && self.atr_stop_multiplier > 0.0) {
            return invalid("atr_stop_multiplier", format!("must be > 0, got {}", self.atr_stop_multiplier));
        }
        if !(self.adx_trend_threshold.is_finite() && (0.0..=100.0).contains(&self.adx_trend_threshold)) {
            return invalid("adx_trend_threshold", format!("must be within [0, 100], got {}", self.adx_trend_threshold));
        }
        for (field, value) in [("rsi_overbought", self.rsi_overbought), ("rsi_oversold", self.rsi_oversold)] {
            if !(value.is_finite() && (0.0..=100.0).contains(&value)) {
                return invalid(field, format!("must be within [0, 100], got {value}"));
            }
        }
        if self.rsi_oversold >= self.rsi_overbought {
            return invalid(
                "rsi_oversold",
                format!("{} must be below rsi_overbought {}", self.rsi_oversold, self.rsi_overbought),
            );
        }
        if !(self.bw_expand_ratio.is_finite() && self.bw_contract_ratio.is_finite() && self.bw_contract_ratio > 0.0) {
            return invalid("bw_contract_ratio", "bandwidth ratios must be finite and positive".to_string());
        }
        if self.bw_contract_ratio >= self.bw_expand_ratio {
            return invalid(
                "bw_contract_ratio",
                format!("{} must be below bw_expand_ratio {}", self.bw_contract_ratio, self.bw_expand_ratio),
            );
        }
        if !self.psar.is_valid() {
            return invalid(
                "psar",
                format!(
                    "needs af_start > 0, af_step > 0 and af_max >= af_start, got {:?}",
                    self.psar
                ),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            rsi_overbought = 80.0
            [psar]
            af_max = 0.3
            "#,
        )
        .unwrap();
        assert_eq!(config.rsi_overbought, 80.0);
        assert_eq!(config.rsi_oversold, 30.0);
        assert_eq!(config.min_rows_required, 60);
        assert_eq!(config.psar.af_max, 0.3);
        assert_eq!(config.psar.af_start, 0.02);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn inverted_rsi_zones_rejected() {
        let err = EngineConfig::from_toml_str("rsi_overbought = 20.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "rsi_oversold", .. }));
    }

    #[test]
    fn non_positive_multiplier_rejected() {
        let config = EngineConfig {
            atr_stop_multiplier: 0.0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_bandwidth_ratios_rejected() {
        let config = EngineConfig {
            bw_expand_ratio: 0.9,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "bw_contract_ratio",
                ..
            })
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = EngineConfig::from_toml_str("min_rows_required = \"sixty\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
