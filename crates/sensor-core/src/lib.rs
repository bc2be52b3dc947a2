//! # Sensor Core
//!
//! This crate provides the core data structures shared by the sensor checkers.
//! It defines the `Sensor` trait, the health contract an estimator polls before
//! fusing a measurement, and the `RangeSample` value produced by distance sensors.

use serde::{Deserialize, Serialize};

/// Health contract common to every sensor feeding the estimator.
///
/// The estimator dispatches through this trait (range finder, flow, baro, ...)
/// instead of checking concrete types.
pub trait Sensor {
    /// Result of the last evaluation.
    fn is_healthy(&self) -> bool;

    /// A new sample is ready and healthy.
    fn is_new_healthy_data(&self) -> bool;

    /// The sample at the fusion horizon is ready and healthy.
    fn is_delayed_healthy_data(&self) -> bool;

    /// Healthy with enough margin to take over from another sensor.
    fn can_be_used_as_failover(&self) -> bool;

    /// Trustworthy enough to re-initialize estimator states from.
    fn can_reset_on_sensor(&self) -> bool;
}

/// A single distance measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeSample {
    /// Monotonic timestamp (microseconds).
    pub timestamp_us: u64,
    /// Measured distance (meters).
    pub distance_m: f32,
    /// Signal quality: 0 = no confidence, -1 = unknown, 1..=100 = confidence in percent.
    pub quality: i8,
}

impl RangeSample {
    pub fn new(timestamp_us: u64, distance_m: f32, quality: i8) -> Self {
        Self {
            timestamp_us,
            distance_m,
            quality,
        }
    }

    /// Returns true when the sensor reported no signal confidence at all.
    ///
    /// # Examples
    ///
    /// ```
    /// use sensor_core::RangeSample;
    ///
    /// assert!(RangeSample::new(0, 1.0, 0).has_bad_quality());
    /// assert!(!RangeSample::new(0, 1.0, -1).has_bad_quality());
    /// ```
    pub fn has_bad_quality(&self) -> bool {
        self.quality == 0
    }
}

/// Key of the ring-buffer slot a delayed sample was retrieved from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleSlot(pub u32);

impl std::fmt::Display for SampleSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}
