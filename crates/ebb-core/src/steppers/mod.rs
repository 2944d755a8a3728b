pub mod euler_maruyama;
pub mod helpers;
pub mod predictor_corrector;
pub mod probability_flow;

use crate::field::{SampleBatch, Time};
use crate::model::ScoreModel;
use crate::noise::NoiseGenerator;
use crate::F;

pub use euler_maruyama::EulerMaruyama;
pub use predictor_corrector::PredictorCorrector;
pub use probability_flow::ProbabilityFlow;

/// Result of one reverse-time update.
///
/// `mean` is the noise-free drift estimate, `state` the noisy iterate that
/// seeds the next step. The sampling loop hands back the last `mean`:
/// skipping the final noise injection is the standard low-variance estimate
/// in score-based sampling.
#[derive(Clone, Debug)]
pub struct StepOutput {
    pub mean: SampleBatch,
    pub state: SampleBatch,
}

/// One reverse-time integration scheme.
///
/// A stepper owns the draw order of its noise, so swapping steppers changes
/// the consumed stream but never couples samples to each other.
pub trait ReverseStepper: Send + Sync {
    /// Advance a batch from time `t` by one step of size `dt`
    fn step(
        &self,
        model: &impl ScoreModel,
        x: &SampleBatch,
        t: Time,
        dt: F,
        rng: &mut NoiseGenerator,
    ) -> StepOutput;
}
