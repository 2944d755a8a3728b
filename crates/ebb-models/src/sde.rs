use ebb_core::{Time, F};

/// Forward noising process of a score-based diffusion model.
///
/// Both operations are closed-form descriptions of the perturbation kernel
/// x_t | x_0 ~ N(mean_coeff * x_0, std^2 * I).
pub trait Sde: Send + Sync {
    /// Diffusion coefficient g(t) of the forward SDE
    fn diffusion_coeff(&self, t: Time) -> F;

    /// (mean_coeff, std) of the perturbation kernel at time t
    fn perturbation(&self, t: Time) -> (F, F);
}
