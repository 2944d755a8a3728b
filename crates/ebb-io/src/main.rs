use clap::Parser;
use ebb_io::{run_sample_command, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sample {
            model,
            stepper,
            height,
            width,
            channels,
            samples,
            steps,
            eps,
            seed,
            out,
            params,
            preview,
            png_scale,
        } => {
            run_sample_command(
                model, stepper, height, width, channels, samples, steps, eps, seed, out, params,
                preview, png_scale,
            )
            .await?;
        }
    }

    Ok(())
}
