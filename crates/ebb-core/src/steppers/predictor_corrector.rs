use super::helpers::langevin_step_sizes;
use super::{EulerMaruyama, ReverseStepper, StepOutput};
use crate::field::{SampleBatch, Time, TimeBatch};
use crate::model::ScoreModel;
use crate::noise::NoiseGenerator;
use crate::F;

/// Langevin-corrected Euler-Maruyama update.
///
/// Each step runs `corrector_steps` Langevin MCMC refinements at the current
/// time before handing off to the Euler-Maruyama predictor. Corrector step
/// sizes come from the signal-to-noise ratio per sample. Costs
/// `corrector_steps + 1` score evaluations per scheduled time.
#[derive(Clone, Copy, Debug)]
pub struct PredictorCorrector {
    pub snr: F,
    pub corrector_steps: usize,
}

impl Default for PredictorCorrector {
    fn default() -> Self {
        Self {
            snr: 0.16,
            corrector_steps: 1,
        }
    }
}

impl ReverseStepper for PredictorCorrector {
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

        let mut x = x.clone();
        for _ in 0..self.corrector_steps {
            let grad = model.score(&x, &t_batch);
            assert_eq!(grad.shape, x.shape, "score output must keep the field shape");
            let z = rng.standard_batch(x.shape, n);
            let eps = langevin_step_sizes(&grad, &z, self.snr);
            x = x
                .add_scaled_columns(&grad, &eps)
                .add_scaled_columns(&z, &eps.map(|e| (2.0 * e).sqrt()));
        }

        EulerMaruyama.step(model, &x, t, dt, rng)
    }
}
