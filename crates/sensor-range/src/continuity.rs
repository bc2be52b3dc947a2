//! # Continuity Tracker
//!
//! Low-pass filtered time between range samples reaching the fusion horizon.
//! A sensor that stops producing data shows a rising interval even when no
//! new sample arrives, because the interval keeps growing by the nominal
//! cycle delta on every cycle without ready data.

/// Filtered interval above which the sensor is considered to have dropped out (µs).
pub const CONTINUITY_THRESHOLD_US: f32 = 2e6;

/// Spike protection applied to raw intervals and to the filter state (µs).
const MAX_INTERVAL_US: f32 = 4e6;

#[derive(Debug, Clone)]
pub struct ContinuityTracker {
    time_constant_us: f32,
    cycle_dt_us: f32,
    /// Filtered interval between consecutive ready samples (µs).
    filtered_us: f32,
    /// Time accumulated since the last ready sample (µs).
    growth_us: f32,
    last_ready_us: Option<u64>,
}

impl ContinuityTracker {
    /// Both durations in microseconds.
    pub fn new(time_constant_us: f32, cycle_dt_us: f32) -> Self {
        Self {
            time_constant_us,
            cycle_dt_us,
            filtered_us: 0.0,
            growth_us: 0.0,
            last_ready_us: None,
        }
    }

    /// Advance the tracker by one fusion cycle.
    ///
    /// A ready sample only counts as new if its timestamp is strictly later
    /// than the last one consumed, so a ready flag that was never cleared does
    /// not pull the filter towards zero. Returns true when a new sample was consumed.
    pub fn update(&mut self, data_ready: bool, sample_time_us: u64) -> bool {
        match (data_ready, self.last_ready_us) {
            (true, None) => {
                self.last_ready_us = Some(sample_time_us);
                self.growth_us = 0.0;
                true
            }
            (true, Some(last)) if sample_time_us > last => {
                let raw_us = ((sample_time_us - last) as f32).min(MAX_INTERVAL_US);
                // First order blend with a time constant expressed in elapsed time.
                let alpha = raw_us / (self.time_constant_us + raw_us);
                self.filtered_us =
                    (self.filtered_us * (1.0 - alpha) + alpha * raw_us).min(MAX_INTERVAL_US);
                self.growth_us = 0.0;
                self.last_ready_us = Some(sample_time_us);
                true
            }
            _ => {
                self.growth_us = (self.growth_us + self.cycle_dt_us).min(MAX_INTERVAL_US);
                false
            }
        }
    }

    /// Filtered inter-update interval including time elapsed since the last ready sample (µs).
    pub fn interval_us(&self) -> f32 {
        (self.filtered_us + self.growth_us).min(MAX_INTERVAL_US)
    }

    pub fn is_continuous(&self) -> bool {
        self.interval_us() < CONTINUITY_THRESHOLD_US
    }

    pub fn last_ready_us(&self) -> Option<u64> {
        self.last_ready_us
    }
}
