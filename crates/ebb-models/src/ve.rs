use crate::sde::Sde;
use ebb_core::{Time, F};
use serde::{Deserialize, Serialize};

/// Variance-exploding SDE: dx = sigma^t dW
///
/// The marginal variance grows as (sigma^2t - 1) / (2 ln sigma) while the
/// clean data is never rescaled (mean_coeff is identically 1).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct VarianceExploding {
    pub sigma: F,
}

impl VarianceExploding {
    pub fn new(sigma: F) -> Self {
        assert!(sigma > 1.0, "sigma must exceed 1 for an exploding variance");
        Self { sigma }
    }

    /// Marginal standard deviation of the forward process at time t
    pub fn marginal_std(&self, t: Time) -> F {
        ((self.sigma.powf(2.0 * t) - 1.0) / (2.0 * self.sigma.ln())).sqrt()
    }
}

impl Default for VarianceExploding {
    fn default() -> Self {
        Self::new(25.0)
    }
}

impl Sde for VarianceExploding {
    fn diffusion_coeff(&self, t: Time) -> F {
        self.sigma.powf(t)
    }

    fn perturbation(&self, t: Time) -> (F, F) {
        (1.0, self.marginal_std(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn marginal_variance_integrates_g_squared() {
        // std(t)^2 must equal the accumulated noise integral of g(s)^2
        let sde = VarianceExploding::new(25.0);
        for &t in &[0.1, 0.5, 1.0] {
            let n = 200_000;
            let h = t / n as f64;
            let integral: f64 = (0..n)
                .map(|i| {
                    let s = (i as f64 + 0.5) * h;
                    sde.diffusion_coeff(s).powi(2) * h
                })
                .sum();
            let (_, std) = sde.perturbation(t);
            assert_relative_eq!(std * std, integral, max_relative = 1e-6);
        }
    }

    #[test]
    fn data_is_never_rescaled() {
        let sde = VarianceExploding::default();
        for &t in &[0.0, 0.3, 1.0] {
            let (mean_coeff, _) = sde.perturbation(t);
            assert_eq!(mean_coeff, 1.0);
        }
    }
}
