use crate::field::{SampleBatch, TimeBatch};
use crate::F;
use nalgebra::DVector;

/// Handle onto a trained (or analytic) score-based diffusion model.
///
/// The sampler drives a model exclusively through these three operations, so
/// network-backed and closed-form models are interchangeable behind it.
pub trait ScoreModel: Send + Sync {
    /// Diffusion coefficient g(t) of the forward SDE, one entry per sample
    fn diffusion(&self, t: &TimeBatch) -> DVector<F>;

    /// Score estimate s(x, t) of the perturbed data distribution, laid out
    /// exactly like `x`
    fn score(&self, x: &SampleBatch, t: &TimeBatch) -> SampleBatch;

    /// Perturbation kernel of the forward process at time t: the mean of
    /// x_t given x_0, and its standard deviation per sample
    fn marginal_prob(&self, x0: &SampleBatch, t: &TimeBatch) -> (SampleBatch, DVector<F>);
}
