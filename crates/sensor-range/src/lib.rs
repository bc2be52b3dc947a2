//! # Sensor Range
//!
//! Per-cycle health gating for a distance sensor (laser or sonar altimeter)
//! feeding a state estimator. Each fusion cycle `SensorRangeFinder::run_checks`
//! decides whether the delayed sample is geometrically usable, within the
//! configured range, arriving at the expected cadence and not frozen.
//!
//! ```
//! use nalgebra::Matrix3;
//! use sensor_core::{RangeSample, SampleSlot, Sensor};
//! use sensor_range::SensorRangeFinder;
//!
//! let mut rf = SensorRangeFinder::default();
//! let sample = RangeSample::new(100_000, 2.0, 100);
//! rf.set_newest_sample(sample);
//! rf.set_delayed_sample(SampleSlot(0), sample);
//! rf.run_checks(100_000, &Matrix3::identity());
//! assert!(rf.is_delayed_healthy_data());
//! rf.set_data_readiness(false);
//! ```

pub mod config;
pub mod continuity;
pub mod error;
pub mod quality;
pub mod range_finder;
pub mod sample;
pub mod stuck;
pub mod tilt;

pub use config::RangeFinderConfig;
pub use continuity::CONTINUITY_THRESHOLD_US;
pub use error::{ConfigError, SampleError};
pub use range_finder::{RangeFinderStatus, SensorRangeFinder};
