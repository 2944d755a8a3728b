use super::{ReverseStepper, StepOutput};
use crate::field::{SampleBatch, Time, TimeBatch};
use crate::model::ScoreModel;
use crate::noise::NoiseGenerator;
use crate::F;

/// Euler-Maruyama discretization of the reverse-time SDE:
/// mean = x + g(t)^2 * s(x, t) * dt, state = mean + sqrt(dt) * g(t) * xi
///
/// One diffusion and one score evaluation per step, fresh noise every step.
#[derive(Clone, Copy, Debug, Default)]
pub struct EulerMaruyama;

impl ReverseStepper for EulerMaruyama {
    fn step(
        &self,
        model: &impl ScoreModel,
        x: &SampleBatch,
        t: Time,
        dt: F,
        rng: &mut NoiseGenerator,
    ) -> StepOutput {
        let n = x.batch_size();
        let t_batch = TimeBatch::splat(t, n);

        let g = model.diffusion(&t_batch);
        let s = model.score(x, &t_batch);
        assert_eq!(s.shape, x.shape, "score output must keep the field shape");
        assert_eq!(g.len(), n, "one diffusion coefficient per sample required");

        let mean = x.add_scaled_columns(&s, &g.map(|gj| gj * gj * dt));

        let xi = rng.standard_batch(x.shape, n);
        let state = mean.add_scaled_columns(&xi, &g.map(|gj| gj * dt.sqrt()));

        StepOutput { mean, state }
    }
}
