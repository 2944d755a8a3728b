use super::{ReverseStepper, StepOutput};
use crate::field::{SampleBatch, Time, TimeBatch};
use crate::model::ScoreModel;
use crate::noise::NoiseGenerator;
use crate::F;

/// Deterministic probability-flow variant of the reverse update:
/// x <- x + 0.5 * g(t)^2 * s(x, t) * dt, no noise consumed.
///
/// Shares the marginals of the stochastic sampler but gives a repeatable
/// trajectory for a fixed starting state, which makes it the cheap choice
/// for likelihood-style comparisons.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProbabilityFlow;

impl ReverseStepper for ProbabilityFlow {
    fn step(
        &self,
        model: &impl ScoreModel,
        x: &SampleBatch,
        t: Time,
        dt: F,
        _rng: &mut NoiseGenerator,
    ) -> StepOutput {
        let n = x.batch_size();
        let t_batch = TimeBatch::splat(t, n);

        let g = model.diffusion(&t_batch);
        let s = model.score(x, &t_batch);
        assert_eq!(s.shape, x.shape, "score output must keep the field shape");
        assert_eq!(g.len(), n, "one diffusion coefficient per sample required");

        let mean = x.add_scaled_columns(&s, &g.map(|gj| 0.5 * gj * gj * dt));

        StepOutput {
            state: mean.clone(),
            mean,
        }
    }
}
