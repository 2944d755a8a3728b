use ebb_core::{
    FieldShape, NoiseGenerator, ReverseStepper, SampleBatch, ScoreModel, SetupError, TimeBatch,
    TimeSchedule, F,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// What one sampling run should produce: field geometry, batch size and the
/// uniform schedule parameters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SampleSpec {
    pub shape: FieldShape,
    pub batch_size: usize,
    pub num_steps: usize,
    pub eps: F,
}

impl SampleSpec {
    pub fn new(shape: FieldShape, batch_size: usize, num_steps: usize, eps: F) -> Self {
        Self {
            shape,
            batch_size,
            num_steps,
            eps,
        }
    }

    pub fn schedule(&self) -> Result<TimeSchedule, SetupError> {
        TimeSchedule::linear(self.num_steps, self.eps)
    }

    fn validate(&self) -> Result<(), SetupError> {
        if self.shape.is_empty() {
            return Err(SetupError::EmptyShape);
        }
        if self.batch_size == 0 {
            return Err(SetupError::EmptyBatch);
        }
        self.schedule().map(|_| ())
    }
}

/// Draw the reverse-time starting state sigma(1) * z, with sigma(1) taken
/// from the model's perturbation kernel at t = 1.
pub fn prior_sample<M: ScoreModel>(
    model: &M,
    shape: FieldShape,
    batch_size: usize,
    rng: &mut NoiseGenerator,
) -> Result<SampleBatch, SetupError> {
    if shape.is_empty() {
        return Err(SetupError::EmptyShape);
    }
    if batch_size == 0 {
        return Err(SetupError::EmptyBatch);
    }
    Ok(draw_prior(model, shape, batch_size, rng))
}

fn draw_prior<M: ScoreModel>(
    model: &M,
    shape: FieldShape,
    batch_size: usize,
    rng: &mut NoiseGenerator,
) -> SampleBatch {
    let t1 = TimeBatch::splat(1.0, batch_size);
    let zeros = SampleBatch::zeros(shape, batch_size);
    let (_, sigma1) = model.marginal_prob(&zeros, &t1);
    rng.standard_batch(shape, batch_size).scale_columns(&sigma1)
}

/// Reverse-time sampler: a stepper driving a model from the noisy prior at
/// t = 1 down the schedule toward the data distribution.
pub struct Sampler<R, M>
where
    R: ReverseStepper,
    M: ScoreModel,
{
    pub stepper: R,
    pub model: M,
}

impl<R, M> Sampler<R, M>
where
    R: ReverseStepper,
    M: ScoreModel,
{
    pub fn new(stepper: R, model: M) -> Self {
        Self { stepper, model }
    }

    /// Integrate one batch down the schedule and return the final noise-free
    /// mean estimate.
    ///
    /// Schedules with fewer than two times run zero update steps: `init_x`
    /// comes back unchanged and the model is never evaluated.
    pub fn sample(
        &self,
        init_x: SampleBatch,
        schedule: &TimeSchedule,
        rng: &mut NoiseGenerator,
    ) -> SampleBatch {
        let (last_t, leading) = match schedule.times().split_last() {
            Some((&last, lead)) if !lead.is_empty() => (last, lead),
            _ => return init_x,
        };

        let dt = schedule.dt();
        let mut state = init_x;
        for &t in leading {
            state = self.stepper.step(&self.model, &state, t, dt, rng).state;
        }
        self.stepper.step(&self.model, &state, last_t, dt, rng).mean
    }

    /// Draw `n_batches` independent batches in parallel, one deterministic
    /// noise stream per batch. Results do not depend on the rayon thread
    /// count.
    pub fn run_batches(
        &self,
        spec: &SampleSpec,
        n_batches: usize,
        global_seed: u64,
    ) -> Result<Ensemble, SetupError> {
        if n_batches == 0 {
            return Err(SetupError::NoBatches);
        }
        spec.validate()?;
        let schedule = spec.schedule()?;

        let batches: Vec<SampleBatch> = (0..n_batches)
            .into_par_iter()
            .map(|batch_id| {
                let mut rng = NoiseGenerator::from_stream(global_seed, batch_id as u64);
                let init = draw_prior(&self.model, spec.shape, spec.batch_size, &mut rng);
                self.sample(init, &schedule, &mut rng)
            })
            .collect();

        Ok(Ensemble {
            batches,
            spec: *spec,
        })
    }
}

/// Batches produced by one `run_batches` call
#[derive(Clone, Debug)]
pub struct Ensemble {
    pub batches: Vec<SampleBatch>,
    pub spec: SampleSpec,
}

impl Ensemble {
    pub fn n_batches(&self) -> usize {
        self.batches.len()
    }

    pub fn total_samples(&self) -> usize {
        self.batches.iter().map(|b| b.batch_size()).sum()
    }

    /// Two-pass summary over every cell of every sample
    pub fn statistics(&self) -> SampleStats {
        let n_samples = self.total_samples();
        let n_values: usize = self.batches.iter().map(|b| b.data.len()).sum();
        if n_values == 0 {
            return SampleStats::empty();
        }

        let mut sum = 0.0;
        let mut min = F::INFINITY;
        let mut max = F::NEG_INFINITY;
        for batch in &self.batches {
            for &v in batch.data.iter() {
                sum += v;
                min = min.min(v);
                max = max.max(v);
            }
        }
        let mean = sum / n_values as F;

        let mut variance = 0.0;
        for batch in &self.batches {
            for &v in batch.data.iter() {
                variance += (v - mean) * (v - mean);
            }
        }
        variance /= (n_values - 1).max(1) as F;

        // Channel c occupies the row block [c * plane, (c + 1) * plane)
        let channels = self.spec.shape.channels;
        let plane = self.spec.shape.height * self.spec.shape.width;
        let mut channel_sums = vec![0.0; channels];
        for batch in &self.batches {
            for col in batch.data.column_iter() {
                for (c, sum) in channel_sums.iter_mut().enumerate() {
                    for &v in col.rows(c * plane, plane).iter() {
                        *sum += v;
                    }
                }
            }
        }
        let channel_means = channel_sums
            .iter()
            .map(|s| s / (n_samples * plane) as F)
            .collect();

        SampleStats {
            n_samples,
            mean,
            variance,
            min,
            max,
            channel_means,
        }
    }
}

/// Summary of an ensemble's values
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SampleStats {
    pub n_samples: usize,
    pub mean: F,
    pub variance: F,
    pub min: F,
    pub max: F,
    pub channel_means: Vec<F>,
}

impl SampleStats {
    fn empty() -> Self {
        Self {
            n_samples: 0,
            mean: 0.0,
            variance: 0.0,
            min: 0.0,
            max: 0.0,
            channel_means: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebb_core::EulerMaruyama;
    use ebb_models::{GaussianScore, VarianceExploding};

    #[test]
    fn spec_builds_its_schedule() {
        let spec = SampleSpec::new(FieldShape::new(8, 8, 1), 4, 100, 1e-3);
        let schedule = spec.schedule().unwrap();
        assert_eq!(schedule.len(), 100);
        assert!((schedule.times()[0] - 1.0).abs() < 1e-15);
    }

    #[test]
    fn batch_runs_report_their_shape() {
        let model = GaussianScore::new(VarianceExploding::default(), 0.0, 1.0);
        let sampler = Sampler::new(EulerMaruyama, model);
        let spec = SampleSpec::new(FieldShape::new(8, 8, 2), 3, 50, 1e-3);

        let ensemble = sampler.run_batches(&spec, 2, 42).unwrap();

        assert_eq!(ensemble.n_batches(), 2);
        assert_eq!(ensemble.total_samples(), 6);
        for batch in &ensemble.batches {
            assert_eq!(batch.shape, spec.shape);
            assert_eq!(batch.batch_size(), 3);
        }
        let stats = ensemble.statistics();
        assert_eq!(stats.n_samples, 6);
        assert_eq!(stats.channel_means.len(), 2);
        assert!(stats.min <= stats.max);
    }

    #[test]
    fn invalid_specs_are_rejected() {
        let model = GaussianScore::new(VarianceExploding::default(), 0.0, 1.0);
        let sampler = Sampler::new(EulerMaruyama, model);
        let ok = SampleSpec::new(FieldShape::new(8, 8, 1), 1, 50, 1e-3);

        let bad_batch = SampleSpec { batch_size: 0, ..ok };
        assert!(sampler.run_batches(&bad_batch, 1, 0).is_err());

        let bad_steps = SampleSpec { num_steps: 1, ..ok };
        assert!(sampler.run_batches(&bad_steps, 1, 0).is_err());

        let bad_shape = SampleSpec {
            shape: FieldShape::new(0, 8, 1),
            ..ok
        };
        assert!(sampler.run_batches(&bad_shape, 1, 0).is_err());

        assert!(sampler.run_batches(&ok, 0, 0).is_err());

        let mut rng = NoiseGenerator::new(1);
        assert!(prior_sample(&sampler.model, FieldShape::new(0, 1, 1), 2, &mut rng).is_err());
        assert!(prior_sample(&sampler.model, ok.shape, 0, &mut rng).is_err());
    }
}
