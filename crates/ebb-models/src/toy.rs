use ebb_core::{SampleBatch, ScoreModel, TimeBatch, F};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Model with zero score and zero diffusion: no drift, no noise.
///
/// Sampling it must hand the initial state back untouched, which pins down
/// the degenerate behavior of every stepper.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ZeroModel;

impl ScoreModel for ZeroModel {
    fn diffusion(&self, t: &TimeBatch) -> DVector<F> {
        DVector::zeros(t.len())
    }

    fn score(&self, x: &SampleBatch, _t: &TimeBatch) -> SampleBatch {
        SampleBatch::zeros(x.shape, x.batch_size())
    }

    fn marginal_prob(&self, x0: &SampleBatch, t: &TimeBatch) -> (SampleBatch, DVector<F>) {
        (x0.clone(), DVector::zeros(t.len()))
    }
}

/// Unit diffusion with a linear restoring score s(x) = -rate * x.
///
/// The Euler-Maruyama iterate under this model is an exact AR(1) chain, so
/// its moments after any number of steps follow a closed-form recursion.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LinearDecay {
    pub rate: F,
}

impl LinearDecay {
    pub fn new(rate: F) -> Self {
        Self { rate }
    }

    /// Variance of the noisy iterate after `steps` updates of size `dt`
    /// starting from a deterministic state
    pub fn em_state_variance(&self, steps: usize, dt: F) -> F {
        let contraction = (1.0 - self.rate * dt).powi(2);
        let mut v = 0.0;
        for _ in 0..steps {
            v = contraction * v + dt;
        }
        v
    }

    /// Variance of the returned noise-free mean after `steps` updates
    pub fn em_mean_variance(&self, steps: usize, dt: F) -> F {
        if steps == 0 {
            return 0.0;
        }
        (1.0 - self.rate * dt).powi(2) * self.em_state_variance(steps - 1, dt)
    }
}

impl ScoreModel for LinearDecay {
    fn diffusion(&self, t: &TimeBatch) -> DVector<F> {
        DVector::from_element(t.len(), 1.0)
    }

    fn score(&self, x: &SampleBatch, _t: &TimeBatch) -> SampleBatch {
        SampleBatch::from_matrix(x.data.map(|v| -self.rate * v), x.shape)
    }

    fn marginal_prob(&self, x0: &SampleBatch, t: &TimeBatch) -> (SampleBatch, DVector<F>) {
        (x0.clone(), t.map(|tj| tj.sqrt()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn variance_recursion_reaches_the_fixed_point() {
        // v* = dt / (1 - (1 - rate * dt)^2) for long chains
        let model = LinearDecay::new(1.0);
        let dt = 0.002;
        let v = model.em_state_variance(20_000, dt);
        let fixed_point = dt / (1.0 - (1.0 - dt).powi(2));
        assert_relative_eq!(v, fixed_point, max_relative = 1e-9);
    }

    #[test]
    fn mean_variance_lags_the_state_by_one_contraction() {
        let model = LinearDecay::new(1.0);
        let dt = 0.002;
        let state = model.em_state_variance(499, dt);
        let mean = model.em_mean_variance(500, dt);
        assert_relative_eq!(mean, (1.0 - dt).powi(2) * state, epsilon = 1e-15);
        assert_eq!(model.em_mean_variance(0, dt), 0.0);
    }
}
