use sensor_core::SampleSlot;

/// Rejected range finder configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },

    #[error("minimum distance must be non-negative, got {0}")]
    NegativeMinDistance(f32),

    #[error("maximum distance {max} must exceed minimum distance {min}")]
    InvertedLimits { min: f32, max: f32 },

    #[error("cosine of max tilt must lie in [-1, 1], got {0}")]
    CosineOutOfRange(f32),

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("stuck sample count must be at least 1")]
    ZeroStuckCount,

    #[error("failover margin fraction must lie in [0, 0.5), got {0}")]
    MarginOutOfRange(f32),
}

/// Misuse of the delayed sample correction path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    #[error("correction targets {requested} but the delayed sample came from {held}")]
    SlotMismatch {
        requested: SampleSlot,
        held: SampleSlot,
    },

    #[error("no delayed sample has been set")]
    NoDelayedSample,
}
