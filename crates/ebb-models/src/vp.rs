use crate::sde::Sde;
use ebb_core::{Time, F};
use serde::{Deserialize, Serialize};

/// Variance-preserving SDE with a linear beta schedule:
/// dx = -0.5 * beta(t) * x dt + sqrt(beta(t)) dW
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct VariancePreserving {
    pub beta_min: F,
    pub beta_max: F,
}

impl VariancePreserving {
    pub fn new(beta_min: F, beta_max: F) -> Self {
        assert!(
            beta_min > 0.0 && beta_max > beta_min,
            "need 0 < beta_min < beta_max"
        );
        Self { beta_min, beta_max }
    }

    /// Noise rate beta(t) = beta_min + t * (beta_max - beta_min)
    pub fn beta(&self, t: Time) -> F {
        self.beta_min + t * (self.beta_max - self.beta_min)
    }

    // log of the mean contraction exp(-0.5 * integral of beta)
    fn log_mean_coeff(&self, t: Time) -> F {
        -0.25 * t * t * (self.beta_max - self.beta_min) - 0.5 * t * self.beta_min
    }
}

impl Default for VariancePreserving {
    fn default() -> Self {
        Self::new(0.1, 20.0)
    }
}

impl Sde for VariancePreserving {
    fn diffusion_coeff(&self, t: Time) -> F {
        self.beta(t).sqrt()
    }

    fn perturbation(&self, t: Time) -> (F, F) {
        let m = self.log_mean_coeff(t).exp();
        (m, (1.0 - m * m).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn preserves_unit_variance() {
        // mean_coeff^2 + std^2 = 1 at every time is the defining property
        let sde = VariancePreserving::default();
        for &t in &[0.0, 0.25, 0.5, 0.75, 1.0] {
            let (m, s) = sde.perturbation(t);
            assert_relative_eq!(m * m + s * s, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn contraction_decays_monotonically() {
        let sde = VariancePreserving::default();
        let mut prev = 1.0;
        for i in 1..=10 {
            let (m, _) = sde.perturbation(i as f64 / 10.0);
            assert!(m < prev);
            prev = m;
        }
        // At t = 1 almost all signal is gone under the default schedule
        assert!(prev < 1e-2);
    }

    #[test]
    fn beta_interpolates_linearly() {
        let sde = VariancePreserving::new(0.1, 20.0);
        assert_relative_eq!(sde.beta(0.0), 0.1, epsilon = 1e-12);
        assert_relative_eq!(sde.beta(1.0), 20.0, epsilon = 1e-12);
        assert_relative_eq!(sde.beta(0.5), 10.05, epsilon = 1e-12);
        assert_relative_eq!(sde.diffusion_coeff(1.0), 20.0_f64.sqrt(), epsilon = 1e-12);
    }
}
