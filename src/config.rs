use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TripError, TripResult};

/// Tunable engine thresholds. Defaults match the production constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixes farther than this from the last accepted fix are GPS jumps
    pub jump_threshold_m: f64,
    /// Deceleration below this (m/s²) counts as harsh braking
    pub harsh_brake_mps2: f64,
    /// Acceleration above this (m/s²) counts as harsh acceleration
    pub harsh_accel_mps2: f64,
    /// Assumed seconds between fixes for the acceleration estimate
    pub nominal_fix_interval_s: f64,
    /// Cornering is not modelled; this value is copied into finalized trips
    pub cornering_score_placeholder: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            jump_threshold_m: 100.0,
            harsh_brake_mps2: -3.0,
            harsh_accel_mps2: 3.0,
            nominal_fix_interval_s: 1.0,
            cornering_score_placeholder: 100,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> TripResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| TripError::InvalidConfig(format!("unparseable config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> TripResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            TripError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> TripResult<()> {
        if !(self.jump_threshold_m.is_finite() && self.jump_threshold_m > 0.0) {
            return Err(TripError::InvalidConfig(format!(
                "jump_threshold_m must be positive, got {}",
                self.jump_threshold_m
            )));
        }
        if !(self.harsh_brake_mps2.is_finite() && self.harsh_brake_mps2 < 0.0) {
            return Err(TripError::InvalidConfig(format!(
                "harsh_brake_mps2 must be negative, got {}",
                self.harsh_brake_mps2
            )));
        }
        if !(self.harsh_accel_mps2.is_finite() && self.harsh_accel_mps2 > 0.0) {
            return Err(TripError::InvalidConfig(format!(
                "harsh_accel_mps2 must be positive, got {}",
                self.harsh_accel_mps2
            )));
        }
        if !(self.nominal_fix_interval_s.is_finite() && self.nominal_fix_interval_s > 0.0) {
            return Err(TripError::InvalidConfig(format!(
                "nominal_fix_interval_s must be positive, got {}",
                self.nominal_fix_interval_s
            )));
        }
        if self.cornering_score_placeholder > 100 {
            return Err(TripError::InvalidConfig(format!(
                "cornering_score_placeholder must be at most 100, got {}",
                self.cornering_score_placeholder
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.jump_threshold_m, 100.0);
        assert_eq!(config.nominal_fix_interval_s, 1.0);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config = EngineConfig::from_json_str(r#"{"jump_threshold_m": 250.0}"#).unwrap();
        assert_eq!(config.jump_threshold_m, 250.0);
        assert_eq!(config.harsh_brake_mps2, -3.0);
        assert_eq!(config.cornering_score_placeholder, 100);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"jump_threshold_m": 0.0}"#),
            Err(TripError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"harsh_brake_mps2": 3.0}"#),
            Err(TripError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{"cornering_score_placeholder": 120}"#),
            Err(TripError::InvalidConfig(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str("not json"),
            Err(TripError::InvalidConfig(_))
        ));
    }
}
