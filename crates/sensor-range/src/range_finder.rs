//! # Range Finder Health Aggregator
//!
//! Runs tilt, continuity, stuck and quality checks once per fusion cycle and
//! combines them with the distance bounds into the validity flag the
//! estimator polls through [`Sensor`].

use nalgebra::Matrix3;
use serde::Serialize;
use tracing::{debug, warn};

use sensor_core::{RangeSample, SampleSlot, Sensor};

use crate::config::{validate_cos_max_tilt, validate_limits, RangeFinderConfig};
use crate::continuity::ContinuityTracker;
use crate::error::{ConfigError, SampleError};
use crate::quality::QualityHysteresis;
use crate::sample::SampleManager;
use crate::stuck::StuckDetector;
use crate::tilt::TiltCheck;

/// Snapshot of every flag and filter value after the last `run_checks`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangeFinderStatus {
    pub healthy: bool,
    pub data_ready: bool,
    pub in_bounds: bool,
    pub tilt_ok: bool,
    pub continuous: bool,
    pub stuck: bool,
    pub quality_ok: bool,
    pub interval_us: f32,
    pub cos_tilt_to_earth: f32,
    pub delayed_distance_m: f32,
    pub delayed_timestamp_us: u64,
}

/// Health checker for a single range finder.
#[derive(Debug, Clone)]
pub struct SensorRangeFinder {
    config: RangeFinderConfig,
    samples: SampleManager,
    tilt: TiltCheck,
    continuity: ContinuityTracker,
    stuck: StuckDetector,
    quality: QualityHysteresis,
    /// True if the range finder sample retrieved from the buffer is valid.
    is_valid: bool,
}

impl SensorRangeFinder {
    pub fn new(config: RangeFinderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: RangeFinderConfig) -> Self {
        Self {
            samples: SampleManager::new(),
            tilt: TiltCheck::new(config.tilt_rad, config.cos_max_tilt),
            continuity: ContinuityTracker::new(
                config.continuity_time_constant_us(),
                config.cycle_dt_us(),
            ),
            stuck: StuckDetector::new(config.stuck_threshold_m, config.stuck_sample_count),
            quality: QualityHysteresis::new(config.quality_hysteresis_us()),
            is_valid: false,
            config,
        }
    }

    /// Evaluate all checks for the current fusion cycle.
    ///
    /// Must be called exactly once per cycle: every call advances the
    /// continuity filter and the quality timers. Every check runs even if an
    /// earlier one already failed.
    pub fn run_checks(&mut self, current_time_us: u64, r_to_earth: &Matrix3<f32>) {
        let was_continuous = self.continuity.is_continuous();
        let was_stuck = self.stuck.is_stuck();
        let was_quality_ok = self.quality.is_quality_ok();
        let was_valid = self.is_valid;

        self.tilt.update(r_to_earth);

        let ready = self.samples.is_data_ready();
        let delayed = *self.samples.delayed();
        let is_new_sample = self.continuity.update(ready, delayed.timestamp_us);

        let in_bounds = self.is_delayed_in_bounds();
        if is_new_sample && in_bounds {
            self.stuck.update(delayed.distance_m);
        }

        self.quality.update(self.samples.newest().quality, current_time_us);

        let checks_pass = in_bounds
            && self.tilt.is_tilt_ok()
            && self.continuity.is_continuous()
            && !self.stuck.is_stuck()
            && self.quality.is_quality_ok();

        // Validity can only be raised by ready data; without it, it can only drop.
        self.is_valid = if ready {
            checks_pass
        } else {
            self.is_valid && checks_pass
        };

        self.log_transitions(was_continuous, was_stuck, was_quality_ok, was_valid, &delayed);
    }

    fn log_transitions(
        &self,
        was_continuous: bool,
        was_stuck: bool,
        was_quality_ok: bool,
        was_valid: bool,
        delayed: &RangeSample,
    ) {
        let interval_us = self.continuity.interval_us();
        match (was_continuous, self.continuity.is_continuous()) {
            (true, false) => warn!(interval_us, "range finder data stream interrupted"),
            (false, true) => debug!(interval_us, "range finder data stream resumed"),
            _ => {}
        }

        match (was_stuck, self.stuck.is_stuck()) {
            (false, true) => warn!(distance_m = delayed.distance_m, "range finder reading stuck"),
            (true, false) => debug!(distance_m = delayed.distance_m, "range finder unstuck"),
            _ => {}
        }

        match (was_quality_ok, self.quality.is_quality_ok()) {
            (true, false) => warn!("range finder signal quality lost"),
            (false, true) => debug!("range finder signal quality recovered"),
            _ => {}
        }

        if was_valid != self.is_valid {
            debug!(
                valid = self.is_valid,
                tilt_ok = self.tilt.is_tilt_ok(),
                in_bounds = self.is_delayed_in_bounds(),
                "range finder validity changed"
            );
        }
    }

    // --- Sample Manager ---

    pub fn set_newest_sample(&mut self, sample: RangeSample) {
        self.samples.set_newest(sample);
    }

    /// Store the sample retrieved from the ring buffer at `slot`. This is the
    /// only way data becomes ready.
    pub fn set_delayed_sample(&mut self, slot: SampleSlot, sample: RangeSample) {
        self.samples.set_delayed(slot, sample);
    }

    pub fn newest_sample(&self) -> &RangeSample {
        self.samples.newest()
    }

    pub fn delayed_sample(&self) -> &RangeSample {
        self.samples.delayed()
    }

    pub fn delayed_slot(&self) -> Option<SampleSlot> {
        self.samples.delayed_slot()
    }

    pub fn delayed_distance(&self) -> f32 {
        self.samples.delayed_distance()
    }

    /// Write a corrected distance into the delayed sample taken from `slot`.
    pub fn set_delayed_distance(
        &mut self,
        slot: SampleSlot,
        distance_m: f32,
    ) -> Result<(), SampleError> {
        self.samples.set_delayed_distance(slot, distance_m)
    }

    /// Cleared by the estimator once the delayed sample has been consumed.
    pub fn set_data_readiness(&mut self, is_ready: bool) {
        self.samples.set_data_ready(is_ready);
    }

    pub fn is_data_ready(&self) -> bool {
        self.samples.is_data_ready()
    }

    pub fn set_validity(&mut self, is_valid: bool) {
        self.is_valid = is_valid;
    }

    // --- Configuration ---

    pub fn config(&self) -> &RangeFinderConfig {
        &self.config
    }

    pub fn set_tilt(&mut self, tilt_rad: f32, cos_max_tilt: f32) -> Result<(), ConfigError> {
        if !tilt_rad.is_finite() {
            return Err(ConfigError::NotFinite {
                field: "tilt_rad",
                value: tilt_rad,
            });
        }
        validate_cos_max_tilt(cos_max_tilt)?;

        self.tilt.set_tilt(tilt_rad, cos_max_tilt);
        self.config.tilt_rad = self.tilt.tilt_rad();
        self.config.cos_max_tilt = cos_max_tilt;
        debug!(tilt_rad, cos_max_tilt, "range finder tilt updated");
        Ok(())
    }

    pub fn set_limits(
        &mut self,
        min_distance_m: f32,
        max_distance_m: f32,
    ) -> Result<(), ConfigError> {
        validate_limits(min_distance_m, max_distance_m)?;
        self.config.min_distance_m = min_distance_m;
        self.config.max_distance_m = max_distance_m;
        debug!(min_distance_m, max_distance_m, "range finder limits updated");
        Ok(())
    }

    pub fn valid_min_distance(&self) -> f32 {
        self.config.min_distance_m
    }

    pub fn valid_max_distance(&self) -> f32 {
        self.config.max_distance_m
    }

    // --- Check results ---

    pub fn is_stuck(&self) -> bool {
        self.stuck.is_stuck()
    }

    pub fn is_tilt_ok(&self) -> bool {
        self.tilt.is_tilt_ok()
    }

    pub fn is_continuous(&self) -> bool {
        self.continuity.is_continuous()
    }

    pub fn is_quality_ok(&self) -> bool {
        self.quality.is_quality_ok()
    }

    /// Cosine of the angle between the sensor axis and the earth vertical,
    /// as computed by the last `run_checks`. Reusable by the flow checks.
    pub fn cos_tilt_to_earth(&self) -> f32 {
        self.tilt.cos_tilt_to_earth()
    }

    pub fn interval_us(&self) -> f32 {
        self.continuity.interval_us()
    }

    pub fn stuck_window(&self) -> Option<(f32, f32)> {
        self.stuck.window()
    }

    fn is_delayed_in_bounds(&self) -> bool {
        let d = self.samples.delayed_distance();
        d >= self.config.min_distance_m && d <= self.config.max_distance_m
    }

    /// Distance kept clear of each limit for failover use (m).
    pub fn failover_margin_m(&self) -> f32 {
        self.config.failover_margin_fraction
            * (self.config.max_distance_m - self.config.min_distance_m)
    }

    pub fn status(&self) -> RangeFinderStatus {
        let delayed = self.samples.delayed();
        RangeFinderStatus {
            healthy: self.is_valid,
            data_ready: self.samples.is_data_ready(),
            in_bounds: self.is_delayed_in_bounds(),
            tilt_ok: self.tilt.is_tilt_ok(),
            continuous: self.continuity.is_continuous(),
            stuck: self.stuck.is_stuck(),
            quality_ok: self.quality.is_quality_ok(),
            interval_us: self.continuity.interval_us(),
            cos_tilt_to_earth: self.tilt.cos_tilt_to_earth(),
            delayed_distance_m: delayed.distance_m,
            delayed_timestamp_us: delayed.timestamp_us,
        }
    }
}

impl Default for SensorRangeFinder {
    fn default() -> Self {
        Self::from_valid_config(RangeFinderConfig::default())
    }
}

impl Sensor for SensorRangeFinder {
    fn is_healthy(&self) -> bool {
        self.is_valid
    }

    fn is_new_healthy_data(&self) -> bool {
        self.samples.is_data_ready() && self.is_valid
    }

    fn is_delayed_healthy_data(&self) -> bool {
        self.samples.is_data_ready() && self.is_valid
    }

    fn can_be_used_as_failover(&self) -> bool {
        let d = self.samples.delayed_distance();
        let margin = self.failover_margin_m();
        self.is_healthy()
            && self.tilt.is_tilt_ok()
            && d >= self.config.min_distance_m + margin
            && d <= self.config.max_distance_m - margin
    }

    fn can_reset_on_sensor(&self) -> bool {
        self.is_valid && self.continuity.is_continuous() && !self.stuck.is_stuck()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CYCLE_US: u64 = 10_000;

    fn config() -> RangeFinderConfig {
        RangeFinderConfig {
            min_distance_m: 0.5,
            max_distance_m: 30.0,
            ..Default::default()
        }
    }

    /// Delivers one sample and runs the ten estimator cycles of a 100 ms period.
    fn deliver(rf: &mut SensorRangeFinder, slot: u32, t_us: u64, distance_m: f32) {
        let sample = RangeSample::new(t_us, distance_m, 100);
        rf.set_newest_sample(sample);
        rf.set_delayed_sample(SampleSlot(slot), sample);
        rf.run_checks(t_us, &Matrix3::identity());
        rf.set_data_readiness(false);
        for i in 1..10 {
            rf.run_checks(t_us + i * CYCLE_US, &Matrix3::identity());
        }
    }

    #[test]
    fn default_state_is_unhealthy() {
        let rf = SensorRangeFinder::default();
        assert!(!rf.is_healthy());
        assert!(!rf.is_stuck());
        assert!(!rf.is_data_ready());
        assert!(!rf.can_reset_on_sensor());
    }

    #[test]
    fn new_rejects_invalid_config() {
        let cfg = RangeFinderConfig {
            max_distance_m: 0.0,
            ..config()
        };
        assert!(SensorRangeFinder::new(cfg).is_err());
    }

    #[test]
    fn validity_requires_ready_data() {
        let mut rf = SensorRangeFinder::new(config()).unwrap();
        rf.set_newest_sample(RangeSample::new(0, 2.0, 100));
        rf.run_checks(0, &Matrix3::identity());
        assert!(!rf.is_healthy());
    }

    #[test]
    fn ready_flag_gates_new_and_delayed_data() {
        let mut rf = SensorRangeFinder::new(config()).unwrap();
        let sample = RangeSample::new(100_000, 2.0, 100);
        rf.set_newest_sample(sample);
        rf.set_delayed_sample(SampleSlot(0), sample);
        rf.run_checks(100_000, &Matrix3::identity());

        assert!(rf.is_healthy());
        assert!(rf.is_new_healthy_data());
        assert!(rf.is_delayed_healthy_data());

        rf.set_data_readiness(false);
        assert!(rf.is_healthy());
        assert!(!rf.is_new_healthy_data());
        assert!(!rf.is_delayed_healthy_data());
    }

    #[test]
    fn validity_latches_between_samples() {
        let mut rf = SensorRangeFinder::new(config()).unwrap();
        deliver(&mut rf, 0, 100_000, 2.0);
        assert!(rf.is_healthy());
        assert!(!rf.is_delayed_healthy_data());
    }

    #[test]
    fn tilt_drops_validity_without_new_data() {
        let mut rf = SensorRangeFinder::new(config()).unwrap();
        deliver(&mut rf, 0, 100_000, 2.0);
        assert!(rf.is_healthy());

        let upside_down = Matrix3::new(1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, -1.0);
        rf.run_checks(200_000, &upside_down);
        assert!(!rf.is_tilt_ok());
        assert!(!rf.is_healthy());

        // Back level, but validity is only raised again by ready data.
        rf.run_checks(210_000, &Matrix3::identity());
        assert!(!rf.is_healthy());
        deliver(&mut rf, 1, 300_000, 2.5);
        assert!(rf.is_healthy());
    }

    #[test]
    fn external_validity_override() {
        let mut rf = SensorRangeFinder::new(config()).unwrap();
        rf.set_validity(true);
        assert!(rf.is_healthy());
        rf.set_validity(false);
        assert!(!rf.is_healthy());
    }

    #[test]
    fn failover_requires_margin_inside_limits() {
        let mut rf = SensorRangeFinder::new(config()).unwrap();
        // Margin is 10 % of 29.5 m = 2.95 m.
        deliver(&mut rf, 0, 100_000, 10.0);
        assert!(rf.is_healthy());
        assert!(rf.can_be_used_as_failover());

        deliver(&mut rf, 1, 200_000, 1.0);
        assert!(rf.is_healthy());
        assert!(!rf.can_be_used_as_failover());

        deliver(&mut rf, 2, 300_000, 28.0);
        assert!(rf.is_healthy());
        assert!(!rf.can_be_used_as_failover());
    }

    #[test]
    fn reset_requires_continuity() {
        let mut rf = SensorRangeFinder::new(config()).unwrap();
        deliver(&mut rf, 0, 100_000, 2.0);
        assert!(rf.can_reset_on_sensor());

        let mut t = 1_000_000;
        while rf.is_continuous() {
            rf.run_checks(t, &Matrix3::identity());
            t += CYCLE_US;
        }
        assert!(!rf.can_reset_on_sensor());
        assert!(!rf.is_healthy());
    }

    #[test]
    fn set_limits_changes_bounds_check() {
        let mut rf = SensorRangeFinder::new(config()).unwrap();
        deliver(&mut rf, 0, 100_000, 2.0);
        assert!(rf.is_healthy());

        rf.set_limits(3.0, 30.0).unwrap();
        assert_eq!(rf.valid_min_distance(), 3.0);
        assert_eq!(rf.valid_max_distance(), 30.0);
        rf.run_checks(200_000, &Matrix3::identity());
        assert!(!rf.is_healthy());
        assert!(!rf.status().in_bounds);
    }

    #[test]
    fn set_limits_rejects_inverted_range() {
        let mut rf = SensorRangeFinder::new(config()).unwrap();
        assert_eq!(
            rf.set_limits(5.0, 1.0),
            Err(ConfigError::InvertedLimits { min: 5.0, max: 1.0 })
        );
        assert_eq!(rf.valid_min_distance(), 0.5);
    }

    #[test]
    fn set_tilt_updates_alignment() {
        let mut rf = SensorRangeFinder::new(config()).unwrap();
        rf.set_tilt(std::f32::consts::FRAC_PI_2, 0.7071).unwrap();
        rf.run_checks(0, &Matrix3::identity());
        assert!(rf.cos_tilt_to_earth().abs() < 1e-6);
        assert!(!rf.is_tilt_ok());
        assert!(rf.set_tilt(0.0, 2.0).is_err());
    }

    #[test]
    fn status_reflects_checks() {
        let mut rf = SensorRangeFinder::new(config()).unwrap();
        deliver(&mut rf, 3, 100_000, 4.0);
        let status = rf.status();
        assert!(status.healthy);
        assert!(!status.data_ready);
        assert!(status.in_bounds && status.tilt_ok && status.continuous);
        assert!(!status.stuck && status.quality_ok);
        assert_eq!(status.delayed_distance_m, 4.0);
        assert_eq!(status.delayed_timestamp_us, 100_000);
    }

    #[test]
    fn dispatch_through_sensor_trait() {
        let mut rf = SensorRangeFinder::new(config()).unwrap();
        deliver(&mut rf, 0, 100_000, 5.0);
        let sensor: &dyn Sensor = &rf;
        assert!(sensor.is_healthy());
        assert!(sensor.can_reset_on_sensor());
    }
}
