use crate::error::SetupError;
use crate::field::Time;
use crate::F;
use serde::{Deserialize, Serialize};

/// Descending sequence of integration times with its constant step size.
///
/// Reverse-time sampling walks from t = 1 (pure noise) down toward a small
/// terminal epsilon; `dt` is the positive magnitude of the spacing between
/// consecutive entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSchedule {
    times: Vec<Time>,
    dt: F,
}

impl TimeSchedule {
    /// Uniform schedule of `num_steps` times from 1.0 down to `eps`.
    ///
    /// Built as t_i = 1 - i * dt so that `times[0] - times[1]` reproduces
    /// `dt` exactly in floating point.
    pub fn linear(num_steps: usize, eps: F) -> Result<Self, SetupError> {
        if num_steps < 2 {
            return Err(SetupError::TooFewSteps(num_steps));
        }
        if !(eps > 0.0 && eps < 1.0) {
            return Err(SetupError::BadTerminalTime(eps));
        }
        let dt = (1.0 - eps) / (num_steps - 1) as F;
        let times = (0..num_steps).map(|i| 1.0 - i as F * dt).collect();
        Ok(Self { times, dt })
    }

    /// Custom schedule. Times must be non-empty, strictly decreasing and
    /// evenly spaced by the positive step `dt`; a single-entry schedule is
    /// legal and makes the sampler a no-op.
    pub fn from_times(times: Vec<Time>, dt: F) -> Result<Self, SetupError> {
        if times.is_empty() {
            return Err(SetupError::EmptySchedule);
        }
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(SetupError::NonPositiveStep(dt));
        }
        for (i, &t) in times.iter().enumerate() {
            if !t.is_finite() {
                return Err(SetupError::NonFiniteTime { index: i });
            }
        }
        // The sampler applies the one declared dt at every scheduled time, so
        // each gap must reproduce it up to rounding noise.
        let tol = (dt * 1e-9).max(1e-12);
        for i in 1..times.len() {
            if times[i] >= times[i - 1] {
                return Err(SetupError::NotDecreasing { index: i });
            }
            let gap = times[i - 1] - times[i];
            if (gap - dt).abs() > tol {
                return Err(SetupError::UnevenSpacing { index: i, gap, dt });
            }
        }
        Ok(Self { times, dt })
    }

    pub fn times(&self) -> &[Time] {
        &self.times
    }

    pub fn dt(&self) -> F {
        self.dt
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_schedule_shape() {
        let s = TimeSchedule::linear(500, 1e-3).unwrap();
        assert_eq!(s.len(), 500);
        assert!((s.times()[0] - 1.0).abs() < 1e-15);
        assert!((s.times()[0] - s.times()[1] - s.dt()).abs() < 1e-15);
        assert!((s.times()[499] - 1e-3).abs() < 1e-12);
        for w in s.times().windows(2) {
            assert!(w[1] < w[0]);
        }
    }

    #[test]
    fn linear_rejects_bad_configs() {
        assert!(TimeSchedule::linear(0, 1e-3).is_err());
        assert!(TimeSchedule::linear(1, 1e-3).is_err());
        assert!(TimeSchedule::linear(100, 0.0).is_err());
        assert!(TimeSchedule::linear(100, 1.0).is_err());
        assert!(TimeSchedule::linear(100, -0.5).is_err());
        assert!(TimeSchedule::linear(100, F::NAN).is_err());
    }

    #[test]
    fn from_times_validates() {
        assert!(TimeSchedule::from_times(vec![], 0.1).is_err());
        assert!(TimeSchedule::from_times(vec![1.0, 0.5], 0.0).is_err());
        assert!(TimeSchedule::from_times(vec![1.0, 0.5], -0.1).is_err());
        assert!(TimeSchedule::from_times(vec![1.0, 0.5], F::NAN).is_err());
        assert!(TimeSchedule::from_times(vec![0.5, 1.0], 0.5).is_err());
        assert!(TimeSchedule::from_times(vec![1.0, 1.0], 0.5).is_err());
        assert!(TimeSchedule::from_times(vec![F::NAN, 0.5], 0.5).is_err());
        assert!(TimeSchedule::from_times(vec![1.0], 0.5).is_ok());
        assert!(TimeSchedule::from_times(vec![1.0, 0.4], 0.6).is_ok());
    }

    #[test]
    fn from_times_requires_even_spacing() {
        // A dt that contradicts the gap between the times is a setup error,
        // and so is non-uniform spacing.
        assert!(TimeSchedule::from_times(vec![1.0, 0.4], 0.01).is_err());
        assert!(TimeSchedule::from_times(vec![1.0, 0.7, 0.5], 0.3).is_err());

        // Linspace-style arithmetic wobbles at rounding level and must pass.
        let dt = (1.0 - 1e-3) / 499.0;
        let times: Vec<Time> = (0..500).map(|i| 1.0 - i as F * dt).collect();
        assert!(TimeSchedule::from_times(times, dt).is_ok());
    }
}
