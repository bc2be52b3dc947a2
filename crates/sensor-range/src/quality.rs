//! # Quality Hysteresis
//!
//! Signal quality must stay at zero for the whole hysteresis duration before
//! the sensor is invalidated, and must then stay non-zero for a fresh,
//! unbroken hysteresis duration before it may be validated again.

#[derive(Debug, Clone)]
pub struct QualityHysteresis {
    hysteresis_us: u64,
    /// Start of the current zero-quality streak.
    bad_since_us: Option<u64>,
    /// Start of the current non-zero streak while latched bad.
    good_since_us: Option<u64>,
    latched_bad: bool,
}

impl QualityHysteresis {
    pub fn new(hysteresis_us: u64) -> Self {
        Self {
            hysteresis_us,
            bad_since_us: None,
            good_since_us: None,
            latched_bad: false,
        }
    }

    pub fn update(&mut self, quality: i8, now_us: u64) {
        if quality == 0 {
            self.good_since_us = None;
            let since = *self.bad_since_us.get_or_insert(now_us);
            if now_us.saturating_sub(since) >= self.hysteresis_us {
                self.latched_bad = true;
            }
            return;
        }

        self.bad_since_us = None;
        if self.latched_bad {
            let since = *self.good_since_us.get_or_insert(now_us);
            if now_us.saturating_sub(since) >= self.hysteresis_us {
                self.latched_bad = false;
                self.good_since_us = None;
            }
        }
    }

    pub fn is_quality_ok(&self) -> bool {
        !self.latched_bad
    }

    /// Start of the current zero-quality streak, if any.
    pub fn bad_since_us(&self) -> Option<u64> {
        self.bad_since_us
    }

    /// Start of the current recovery streak, if any.
    pub fn good_since_us(&self) -> Option<u64> {
        self.good_since_us
    }
}
