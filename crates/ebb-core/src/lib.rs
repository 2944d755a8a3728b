pub mod field;
pub mod model;
pub mod schedule;
pub mod noise;
pub mod error;
pub mod steppers;

// Core types
pub type F = f64;
pub use field::{FieldShape, SampleBatch, Time, TimeBatch};
pub use noise::NoiseGenerator;
pub use schedule::TimeSchedule;
pub use error::SetupError;

// Model seam
pub use model::ScoreModel;

// Steppers
pub use steppers::{
    EulerMaruyama, PredictorCorrector, ProbabilityFlow, ReverseStepper, StepOutput,
};
