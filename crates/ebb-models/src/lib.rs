pub mod gaussian;
pub mod sde;
pub mod toy;
pub mod ve;
pub mod vp;

pub use gaussian::GaussianScore;
pub use sde::Sde;
pub use toy::{LinearDecay, ZeroModel};
pub use ve::VarianceExploding;
pub use vp::VariancePreserving;
