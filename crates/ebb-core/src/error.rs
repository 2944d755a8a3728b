use crate::F;

/// Configuration problems rejected before any sampling starts.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("a uniform time schedule needs at least two points, got {0}")]
    TooFewSteps(usize),

    #[error("terminal time must lie strictly inside (0, 1), got {0}")]
    BadTerminalTime(F),

    #[error("time schedule must not be empty")]
    EmptySchedule,

    #[error("step size must be positive and finite, got {0}")]
    NonPositiveStep(F),

    #[error("schedule times must be strictly decreasing (violated at index {index})")]
    NotDecreasing { index: usize },

    #[error("schedule times must be finite (violated at index {index})")]
    NonFiniteTime { index: usize },

    #[error("schedule gap {gap} at index {index} does not match the step size {dt}")]
    UnevenSpacing { index: usize, gap: F, dt: F },

    #[error("field shape has no cells")]
    EmptyShape,

    #[error("batch size must be at least one")]
    EmptyBatch,

    #[error("batch count must be at least one")]
    NoBatches,
}
