use anyhow::Result;
use clap::Parser;
use ebb_core::{
    EulerMaruyama, FieldShape, NoiseGenerator, PredictorCorrector, ProbabilityFlow,
    ReverseStepper, TimeSchedule,
};
use ebb_models::{GaussianScore, VarianceExploding};
use ebb_sampler::{prior_sample, Sampler};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Sweep step counts and record moment errors per stepper")]
struct Args {
    /// Samples per run
    #[arg(long, default_value_t = 8)]
    samples: usize,

    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output CSV file
    #[arg(long, default_value = "runs/stepper_sweep.csv")]
    out: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let data_mean = 1.0;
    let data_std = 0.5;
    let model = GaussianScore::new(VarianceExploding::new(25.0), data_mean, data_std);
    let shape = FieldShape::new(24, 24, 1);
    let eps = 1e-3;

    let step_counts = [50, 100, 250, 500, 1000];

    println!(
        "Sweeping step counts {:?} with {} samples per run",
        step_counts, args.samples
    );

    let mut csv = String::from("steps,stepper,mean_abs_err,var_rel_err\n");

    for &steps in &step_counts {
        println!("\nProcessing {} steps", steps);
        let schedule = TimeSchedule::linear(steps, eps)?;

        let (m, v) = moments(EulerMaruyama, &model, shape, args.samples, &schedule, args.seed);
        record(&mut csv, steps, "euler_maruyama", m, v, &model, eps);

        let (m, v) = moments(
            PredictorCorrector::default(),
            &model,
            shape,
            args.samples,
            &schedule,
            args.seed,
        );
        record(&mut csv, steps, "predictor_corrector", m, v, &model, eps);

        let (m, v) = moments(
            ProbabilityFlow,
            &model,
            shape,
            args.samples,
            &schedule,
            args.seed,
        );
        record(&mut csv, steps, "probability_flow", m, v, &model, eps);
    }

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(&args.out)?;
    write!(file, "{}", csv)?;

    println!("\nSaved results to {}", args.out.display());
    Ok(())
}

fn moments<R: ReverseStepper>(
    stepper: R,
    model: &GaussianScore<VarianceExploding>,
    shape: FieldShape,
    samples: usize,
    schedule: &TimeSchedule,
    seed: u64,
) -> (f64, f64) {
    let sampler = Sampler::new(stepper, *model);
    let mut rng = NoiseGenerator::new(seed);
    let init = prior_sample(&sampler.model, shape, samples, &mut rng).expect("valid prior");
    let out = sampler.sample(init, schedule, &mut rng);

    let n = out.data.len();
    let mean = out.data.iter().sum::<f64>() / n as f64;
    let var = out.data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, var)
}

fn record(
    csv: &mut String,
    steps: usize,
    stepper: &str,
    mean: f64,
    var: f64,
    model: &GaussianScore<VarianceExploding>,
    eps: f64,
) {
    let target_var = model.perturbed_std(eps).powi(2);
    let mean_err = (mean - model.data_mean).abs();
    let var_err = (var - target_var).abs() / target_var;
    println!(
        "  {:<20} mean_err={:.4} var_err={:.4}",
        stepper, mean_err, var_err
    );
    csv.push_str(&format!("{},{},{},{}\n", steps, stepper, mean_err, var_err));
}
