//! # Stuck Detector
//!
//! Catches a sensor returning the same value over and over (frozen ADC,
//! stuck reflection). Only readings inside the valid distance range are fed
//! in, so "out of range" is never mistaken for "frozen".

#[derive(Debug, Clone)]
pub struct StuckDetector {
    threshold_m: f32,
    sample_count: u32,
    /// `(min, max)` of the readings since the last reset, `None` until the first reading.
    window: Option<(f32, f32)>,
    /// Number of readings inside the current window.
    run: u32,
    is_stuck: bool,
}

impl StuckDetector {
    pub fn new(threshold_m: f32, sample_count: u32) -> Self {
        Self {
            threshold_m,
            sample_count,
            window: None,
            run: 0,
            is_stuck: false,
        }
    }

    /// Add an accepted in-range reading.
    pub fn update(&mut self, distance_m: f32) {
        let Some((min, max)) = self.window else {
            self.reset_to(distance_m);
            return;
        };

        let min = min.min(distance_m);
        let max = max.max(distance_m);
        if max - min > self.threshold_m {
            // Enough variation: the sensor is alive, restart from this reading.
            self.reset_to(distance_m);
            return;
        }

        self.window = Some((min, max));
        self.run = self.run.saturating_add(1);
        self.is_stuck = self.run >= self.sample_count;
    }

    fn reset_to(&mut self, distance_m: f32) {
        self.window = Some((distance_m, distance_m));
        self.run = 1;
        self.is_stuck = self.sample_count <= 1;
    }

    pub fn is_stuck(&self) -> bool {
        self.is_stuck
    }

    pub fn window(&self) -> Option<(f32, f32)> {
        self.window
    }

    pub fn run_length(&self) -> u32 {
        self.run
    }
}
