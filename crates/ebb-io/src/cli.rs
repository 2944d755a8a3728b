use crate::render::save_channel_pngs;
use crate::{write_batch_with_manifest, RunManifest};
use clap::{Parser, Subcommand, ValueEnum};
use ebb_core::{
    EulerMaruyama, FieldShape, NoiseGenerator, PredictorCorrector, ProbabilityFlow,
    ReverseStepper, SampleBatch, ScoreModel,
};
use ebb_models::{GaussianScore, LinearDecay, VarianceExploding, VariancePreserving};
use ebb_sampler::{prior_sample, Ensemble, SampleSpec, Sampler};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "ebb")]
#[command(about = "EBB - Reverse-time diffusion sampling engine")]
#[command(
    long_about = "Score-based generative sampling of gridded geophysical fields by reverse-time SDE integration"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Draw samples from a score model and write them to Parquet
    Sample {
        /// Model type
        #[arg(long, value_enum)]
        model: ModelType,

        /// Stepper type
        #[arg(long, value_enum, default_value = "euler-maruyama")]
        stepper: StepperType,

        /// Grid height
        #[arg(long, default_value = "64")]
        height: usize,

        /// Grid width
        #[arg(long, default_value = "64")]
        width: usize,

        /// Channels per grid cell
        #[arg(long, default_value = "1")]
        channels: usize,

        /// Number of samples in the batch
        #[arg(long, default_value = "8")]
        samples: usize,

        /// Number of integration steps
        #[arg(long, default_value = "500")]
        steps: usize,

        /// Terminal integration time
        #[arg(long, default_value = "1e-3")]
        eps: f64,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output Parquet file
        #[arg(long)]
        out: PathBuf,

        /// Model-specific parameters (JSON)
        #[arg(long)]
        params: Option<String>,

        /// Directory for PNG previews of the sampled fields
        #[arg(long)]
        preview: Option<PathBuf>,

        /// Nearest-neighbor upscale factor for previews
        #[arg(long, default_value = "4")]
        png_scale: u32,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModelType {
    #[value(name = "ve-gaussian")]
    VeGaussian,
    #[value(name = "vp-gaussian")]
    VpGaussian,
    #[value(name = "linear-decay")]
    LinearDecay,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StepperType {
    #[value(name = "euler-maruyama")]
    EulerMaruyama,
    #[value(name = "predictor-corrector")]
    PredictorCorrector,
    #[value(name = "probability-flow")]
    ProbabilityFlow,
}

pub async fn run_sample_command(
    model: ModelType,
    stepper: StepperType,
    height: usize,
    width: usize,
    channels: usize,
    samples: usize,
    steps: usize,
    eps: f64,
    seed: u64,
    out: PathBuf,
    params: Option<String>,
    preview: Option<PathBuf>,
    png_scale: u32,
) -> anyhow::Result<()> {
    println!("EBB Sampling");
    println!("============");
    println!("Model: {:?}", model);
    println!("Stepper: {:?}", stepper);
    println!("Grid: {}x{}x{}", height, width, channels);
    println!("Samples: {}", samples);
    println!("Steps: {} (eps = {})", steps, eps);
    println!("Seed: {}", seed);
    println!();

    // Parse model parameters
    let model_params: serde_json::Value = if let Some(params_str) = &params {
        serde_json::from_str(params_str)?
    } else {
        json!({})
    };

    // Validate the run configuration up front
    let spec = SampleSpec::new(FieldShape::new(height, width, channels), samples, steps, eps);
    let schedule = spec.schedule()?;

    let model_name = match model {
        ModelType::VeGaussian => "ve_gaussian",
        ModelType::VpGaussian => "vp_gaussian",
        ModelType::LinearDecay => "linear_decay",
    };
    let stepper_name = match stepper {
        StepperType::EulerMaruyama => "euler_maruyama",
        StepperType::PredictorCorrector => "predictor_corrector",
        StepperType::ProbabilityFlow => "probability_flow",
    };

    let manifest = RunManifest::new(
        seed,
        model_name,
        model_params.clone(),
        stepper_name,
        &spec,
        &schedule,
    );

    info!(run_id = %manifest.run_id, model = model_name, stepper = stepper_name, "starting sampling run");

    let param = |key: &str, default: f64| {
        model_params
            .get(key)
            .and_then(|v| v.as_f64())
            .unwrap_or(default)
    };

    // Run sampling based on model type
    let batch = match model {
        ModelType::VeGaussian => {
            let sde = VarianceExploding::new(param("sigma", 25.0));
            let score = GaussianScore::new(sde, param("data_mean", 0.0), param("data_std", 1.0));
            run_sampling(stepper, score, &spec, seed)?
        }
        ModelType::VpGaussian => {
            let sde = VariancePreserving::new(param("beta_min", 0.1), param("beta_max", 20.0));
            let score = GaussianScore::new(sde, param("data_mean", 0.0), param("data_std", 1.0));
            run_sampling(stepper, score, &spec, seed)?
        }
        ModelType::LinearDecay => {
            let score = LinearDecay::new(param("rate", 1.0));
            run_sampling(stepper, score, &spec, seed)?
        }
    };

    info!(run_id = %manifest.run_id, "sampling finished, writing outputs");

    // Write output files
    let manifest_path = out.with_extension("manifest.json");
    write_batch_with_manifest(&batch, &manifest, &out, &manifest_path)?;

    if let Some(preview_dir) = &preview {
        save_channel_pngs(&batch, preview_dir, png_scale)?;
        println!("Wrote previews to {}", preview_dir.display());
    }

    // Print summary statistics
    let ensemble = Ensemble {
        batches: vec![batch],
        spec,
    };
    let stats = ensemble.statistics();

    println!();
    println!("Summary Statistics:");
    println!("==================");
    println!("Samples: {}", stats.n_samples);
    println!("Mean: {:.6}", stats.mean);
    println!("Std: {:.6}", stats.variance.sqrt());
    println!("Min: {:.6}", stats.min);
    println!("Max: {:.6}", stats.max);
    for (c, m) in stats.channel_means.iter().enumerate() {
        println!("Channel {} mean: {:.6}", c, m);
    }
    println!();
    println!("✓ Sampling completed successfully!");

    Ok(())
}

fn run_sampling<M>(
    stepper: StepperType,
    model: M,
    spec: &SampleSpec,
    seed: u64,
) -> anyhow::Result<SampleBatch>
where
    M: ScoreModel,
{
    match stepper {
        StepperType::EulerMaruyama => sample_with(EulerMaruyama, model, spec, seed),
        StepperType::PredictorCorrector => {
            sample_with(PredictorCorrector::default(), model, spec, seed)
        }
        StepperType::ProbabilityFlow => sample_with(ProbabilityFlow, model, spec, seed),
    }
}

fn sample_with<R, M>(stepper: R, model: M, spec: &SampleSpec, seed: u64) -> anyhow::Result<SampleBatch>
where
    R: ReverseStepper,
    M: ScoreModel,
{
    let schedule = spec.schedule()?;
    let mut rng = NoiseGenerator::new(seed);
    let init = prior_sample(&model, spec.shape, spec.batch_size, &mut rng)?;
    let sampler = Sampler::new(stepper, model);
    Ok(sampler.sample(init, &schedule, &mut rng))
}
