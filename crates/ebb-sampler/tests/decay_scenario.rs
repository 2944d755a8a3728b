use approx::assert_relative_eq;
use ebb_core::{EulerMaruyama, FieldShape, NoiseGenerator, SampleBatch, TimeSchedule};
use ebb_models::LinearDecay;
use ebb_sampler::Sampler;

/// Pooled second moment of the returned means over independent seed streams
fn sampled_variance(rate: f64, schedule: &TimeSchedule, n_streams: u64) -> f64 {
    let shape = FieldShape::new(32, 32, 1);
    let batch_size = 5;
    let sampler = Sampler::new(EulerMaruyama, LinearDecay::new(rate));

    // Starting from zero keeps the mean exactly zero by symmetry, so the
    // second moment about zero estimates the variance directly
    let mut pooled = 0.0;
    let mut count = 0usize;
    for stream in 0..n_streams {
        let mut rng = NoiseGenerator::from_stream(42, stream);
        let init = SampleBatch::zeros(shape, batch_size);
        let out = sampler.sample(init, schedule, &mut rng);
        for &v in out.data.iter() {
            pooled += v * v;
            count += 1;
        }
    }
    pooled / count as f64
}

#[test]
fn linear_decay_matches_the_exact_recursion() {
    // Unit diffusion with score -x makes the Euler-Maruyama chain an exact
    // AR(1) process with closed-form variance
    let num_steps = 500;
    let schedule = TimeSchedule::linear(num_steps, 1e-3).unwrap();
    let model = LinearDecay::new(1.0);

    let sample_var = sampled_variance(1.0, &schedule, 8);
    let expected = model.em_mean_variance(num_steps, schedule.dt());

    println!("Linear decay scenario:");
    println!("Sampled variance: {:.6}", sample_var);
    println!("Exact variance:   {:.6}", expected);

    assert_relative_eq!(sample_var, expected, max_relative = 0.05);
}

#[test]
fn restoring_score_beats_raw_noise_accumulation() {
    // With the score switched off the chain is a pure random walk; the
    // restoring score must end with clearly smaller spread
    let num_steps = 500;
    let schedule = TimeSchedule::linear(num_steps, 1e-3).unwrap();

    let damped_var = sampled_variance(1.0, &schedule, 8);
    let raw_var = sampled_variance(0.0, &schedule, 8);

    let raw_expected = LinearDecay::new(0.0).em_mean_variance(num_steps, schedule.dt());

    println!("Damped variance: {:.6}", damped_var);
    println!("Raw-walk variance: {:.6} (exact {:.6})", raw_var, raw_expected);

    assert_relative_eq!(raw_var, raw_expected, max_relative = 0.05);
    assert!(
        damped_var < 0.6 * raw_var,
        "restoring score should suppress the accumulated noise ({} vs {})",
        damped_var,
        raw_var
    );
}
