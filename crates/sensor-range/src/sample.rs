//! Holding buffer for the newest and the delayed range sample.

use sensor_core::{RangeSample, SampleSlot};

use crate::error::SampleError;

#[derive(Debug, Clone, Default)]
pub struct SampleManager {
    newest: RangeSample,
    delayed: RangeSample,
    /// Ring-buffer slot of the delayed sample, `None` until one was set.
    delayed_slot: Option<SampleSlot>,
    /// True when a delayed sample has fallen behind the fusion horizon and is
    /// available to be fused. Cleared only by the consumer.
    data_ready: bool,
}

impl SampleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_newest(&mut self, sample: RangeSample) {
        self.newest = sample;
    }

    /// Store the sample retrieved from `slot` and mark data as ready.
    pub fn set_delayed(&mut self, slot: SampleSlot, sample: RangeSample) {
        self.delayed = sample;
        self.delayed_slot = Some(slot);
        self.data_ready = true;
    }

    pub fn newest(&self) -> &RangeSample {
        &self.newest
    }

    pub fn delayed(&self) -> &RangeSample {
        &self.delayed
    }

    pub fn delayed_slot(&self) -> Option<SampleSlot> {
        self.delayed_slot
    }

    pub fn delayed_distance(&self) -> f32 {
        self.delayed.distance_m
    }

    /// Overwrite the distance of the held delayed sample, e.g. after bias removal.
    pub fn set_delayed_distance(
        &mut self,
        slot: SampleSlot,
        distance_m: f32,
    ) -> Result<(), SampleError> {
        match self.delayed_slot {
            None => Err(SampleError::NoDelayedSample),
            Some(held) if held != slot => Err(SampleError::SlotMismatch {
                requested: slot,
                held,
            }),
            Some(_) => {
                self.delayed.distance_m = distance_m;
                Ok(())
            }
        }
    }

    pub fn is_data_ready(&self) -> bool {
        self.data_ready
    }

    pub fn set_data_ready(&mut self, ready: bool) {
        self.data_ready = ready;
    }
}
