use anyhow::Result;
use ebb_core::{EulerMaruyama, FieldShape, NoiseGenerator, TimeSchedule};
use ebb_cpu::SimdEulerMaruyama;
use ebb_models::{GaussianScore, VarianceExploding};
use ebb_sampler::{prior_sample, Sampler};
use std::time::Instant;

fn main() -> Result<()> {
    let model = GaussianScore::new(VarianceExploding::new(25.0), 0.5, 0.3);
    let shape = FieldShape::new(96, 96, 2);
    let batch_size = 16;
    let schedule = TimeSchedule::linear(250, 1e-3)?;

    println!(
        "Comparing scalar and SIMD Euler-Maruyama on {}x{}x{} fields, batch of {}",
        shape.height, shape.width, shape.channels, batch_size
    );

    let mut rng = NoiseGenerator::new(3);
    let init = prior_sample(&model, shape, batch_size, &mut rng)?;

    let scalar = Sampler::new(EulerMaruyama, model);
    let mut rng_a = NoiseGenerator::new(17);
    let t0 = Instant::now();
    let ref_out = scalar.sample(init.clone(), &schedule, &mut rng_a);
    let scalar_time = t0.elapsed();

    let simd = Sampler::new(SimdEulerMaruyama::new(), model);
    let mut rng_b = NoiseGenerator::new(17);
    let t0 = Instant::now();
    let simd_out = simd.sample(init, &schedule, &mut rng_b);
    let simd_time = t0.elapsed();

    let max_diff = ref_out
        .data
        .iter()
        .zip(simd_out.data.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0f64, f64::max);

    println!("Scalar: {:.2?}", scalar_time);
    println!("SIMD:   {:.2?}", simd_time);
    println!("Max elementwise difference: {:.2e}", max_diff);

    assert_eq!(ref_out, simd_out, "SIMD stepper must match the scalar stepper");
    println!("✓ Outputs agree exactly");
    Ok(())
}
