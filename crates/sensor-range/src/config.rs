//! # Range Finder Configuration
//!
//! Parameters injected by the estimator's parameter system, either as a
//! `RangeFinderConfig` value or as a JSON document.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Static configuration of one range finder checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeFinderConfig {
    /// Mounting tilt about the body Y axis (radians, 0 = pointing straight down).
    pub tilt_rad: f32,
    /// Cosine of the maximum tilt from the vertical that still permits use.
    pub cos_max_tilt: f32,
    /// Minimum distance the sensor can measure (m).
    pub min_distance_m: f32,
    /// Maximum distance the sensor can measure (m).
    pub max_distance_m: f32,
    /// Minimum spread of readings required to declare the sensor unstuck (m).
    pub stuck_threshold_m: f32,
    /// Number of consecutive readings inside the threshold before declaring stuck.
    pub stuck_sample_count: u32,
    /// Duration of zero quality before invalidating, and of non-zero quality
    /// before recovering (ms).
    pub quality_hysteresis_ms: u64,
    /// Time constant of the inter-sample interval filter (s).
    pub continuity_time_constant_s: f32,
    /// Nominal estimator fusion cycle (s).
    pub cycle_dt_s: f32,
    /// Fraction of the valid span kept clear of each limit for failover use.
    pub failover_margin_fraction: f32,
}

impl Default for RangeFinderConfig {
    fn default() -> Self {
        Self {
            tilt_rad: 0.0,
            cos_max_tilt: 0.7071,
            min_distance_m: 0.1,
            max_distance_m: 30.0,
            stuck_threshold_m: 0.1,
            stuck_sample_count: 5,
            quality_hysteresis_ms: 1000,
            continuity_time_constant_s: 2.0,
            cycle_dt_s: 0.01,
            failover_margin_fraction: 0.1,
        }
    }
}

impl RangeFinderConfig {
    /// Parse and validate a JSON document. Missing fields take their defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use sensor_range::RangeFinderConfig;
    ///
    /// let cfg = RangeFinderConfig::from_json(r#"{ "min_distance_m": 0.5 }"#).unwrap();
    /// assert_eq!(cfg.min_distance_m, 0.5);
    /// assert_eq!(cfg.max_distance_m, 30.0);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).context("failed to parse range finder configuration")?;
        config
            .validate()
            .context("invalid range finder configuration")?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("tilt_rad", self.tilt_rad),
            ("cos_max_tilt", self.cos_max_tilt),
            ("min_distance_m", self.min_distance_m),
            ("max_distance_m", self.max_distance_m),
            ("stuck_threshold_m", self.stuck_threshold_m),
            ("continuity_time_constant_s", self.continuity_time_constant_s),
            ("cycle_dt_s", self.cycle_dt_s),
            ("failover_margin_fraction", self.failover_margin_fraction),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }

        validate_limits(self.min_distance_m, self.max_distance_m)?;
        validate_cos_max_tilt(self.cos_max_tilt)?;

        let positive = [
            ("stuck_threshold_m", self.stuck_threshold_m),
            ("continuity_time_constant_s", self.continuity_time_constant_s),
            ("cycle_dt_s", self.cycle_dt_s),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        if self.stuck_sample_count == 0 {
            return Err(ConfigError::ZeroStuckCount);
        }
        if !(0.0..0.5).contains(&self.failover_margin_fraction) {
            return Err(ConfigError::MarginOutOfRange(self.failover_margin_fraction));
        }
        Ok(())
    }

    /// Quality hysteresis in microseconds.
    pub fn quality_hysteresis_us(&self) -> u64 {
        self.quality_hysteresis_ms.saturating_mul(1000)
    }

    /// Continuity filter time constant in microseconds.
    pub fn continuity_time_constant_us(&self) -> f32 {
        self.continuity_time_constant_s * 1e6
    }

    /// Nominal cycle delta in microseconds.
    pub fn cycle_dt_us(&self) -> f32 {
        self.cycle_dt_s * 1e6
    }
}

pub(crate) fn validate_limits(min: f32, max: f32) -> Result<(), ConfigError> {
    if !min.is_finite() {
        return Err(ConfigError::NotFinite {
            field: "min_distance_m",
            value: min,
        });
    }
    if !max.is_finite() {
        return Err(ConfigError::NotFinite {
            field: "max_distance_m",
            value: max,
        });
    }
    if min < 0.0 {
        return Err(ConfigError::NegativeMinDistance(min));
    }
    if max <= min {
        return Err(ConfigError::InvertedLimits { min, max });
    }
    Ok(())
}

pub(crate) fn validate_cos_max_tilt(cos_max_tilt: f32) -> Result<(), ConfigError> {
    if !cos_max_tilt.is_finite() {
        return Err(ConfigError::NotFinite {
            field: "cos_max_tilt",
            value: cos_max_tilt,
        });
    }
    if !(-1.0..=1.0).contains(&cos_max_tilt) {
        return Err(ConfigError::CosineOutOfRange(cos_max_tilt));
    }
    Ok(())
}
