use crate::sde::Sde;
use ebb_core::{SampleBatch, ScoreModel, Time, TimeBatch, F};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Closed-form score model for i.i.d. Gaussian data N(mean, std^2) per cell.
///
/// Under a kernel N(m_t * x0, s_t^2 * I) the perturbed marginal is
/// N(m_t * mean, m_t^2 * std^2 + s_t^2) per cell, so the exact score is
/// (m_t * mean - x) / (m_t^2 * std^2 + s_t^2). Lets the full sampling stack
/// be checked against analytic moments without a trained network.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct GaussianScore<S> {
    pub sde: S,
    pub data_mean: F,
    pub data_std: F,
}

impl<S: Sde> GaussianScore<S> {
    pub fn new(sde: S, data_mean: F, data_std: F) -> Self {
        assert!(data_std > 0.0, "data standard deviation must be positive");
        Self {
            sde,
            data_mean,
            data_std,
        }
    }

    /// Standard deviation of the perturbed marginal at time t
    pub fn perturbed_std(&self, t: Time) -> F {
        let (m, s) = self.sde.perturbation(t);
        (m * m * self.data_std * self.data_std + s * s).sqrt()
    }
}

impl<S: Sde> ScoreModel for GaussianScore<S> {
    fn diffusion(&self, t: &TimeBatch) -> DVector<F> {
        t.map(|tj| self.sde.diffusion_coeff(tj))
    }

    fn score(&self, x: &SampleBatch, t: &TimeBatch) -> SampleBatch {
        assert_eq!(t.len(), x.batch_size(), "one time per sample required");
        let mut out = x.clone();
        for (j, mut col) in out.data.column_iter_mut().enumerate() {
            let (m, s) = self.sde.perturbation(t[j]);
            let var = m * m * self.data_std * self.data_std + s * s;
            let target = m * self.data_mean;
            for v in col.iter_mut() {
                *v = (target - *v) / var;
            }
        }
        out
    }

    fn marginal_prob(&self, x0: &SampleBatch, t: &TimeBatch) -> (SampleBatch, DVector<F>) {
        assert_eq!(t.len(), x0.batch_size(), "one time per sample required");
        let coeffs = t.map(|tj| self.sde.perturbation(tj).0);
        let stds = t.map(|tj| self.sde.perturbation(tj).1);
        (x0.scale_columns(&coeffs), stds)
    }
}
