use crate::field::SampleBatch;
use crate::F;
use nalgebra::DVector;

/// Per-sample Langevin step sizes 2 * (snr * ||z|| / ||grad||)^2.
///
/// Norms are taken per column, so each sample gets its own step size and
/// samples never couple. A vanishing score norm yields a zero step for that
/// sample instead of a division by zero.
pub fn langevin_step_sizes(grad: &SampleBatch, z: &SampleBatch, snr: F) -> DVector<F> {
    DVector::from_fn(grad.batch_size(), |j, _| {
        let grad_norm = grad.data.column(j).norm();
        let z_norm = z.data.column(j).norm();
        if grad_norm > 0.0 {
            2.0 * (snr * z_norm / grad_norm).powi(2)
        } else {
            0.0
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldShape;
    use nalgebra::DMatrix;

    #[test]
    fn zero_gradient_gives_zero_step() {
        let shape = FieldShape::new(2, 2, 1);
        let grad = SampleBatch::zeros(shape, 2);
        let z = SampleBatch::from_matrix(DMatrix::from_element(shape.len(), 2, 1.0), shape);
        let eps = langevin_step_sizes(&grad, &z, 0.16);
        assert_eq!(eps[0], 0.0);
        assert_eq!(eps[1], 0.0);
    }

    #[test]
    fn step_sizes_are_per_sample() {
        let shape = FieldShape::new(2, 2, 1);
        // Second column has twice the gradient norm of the first
        let grad = SampleBatch::from_matrix(
            DMatrix::from_fn(shape.len(), 2, |_, j| (j + 1) as f64),
            shape,
        );
        let z = SampleBatch::from_matrix(DMatrix::from_element(shape.len(), 2, 1.0), shape);
        let eps = langevin_step_sizes(&grad, &z, 0.16);
        assert!((eps[0] / eps[1] - 4.0).abs() < 1e-12);
    }
}
