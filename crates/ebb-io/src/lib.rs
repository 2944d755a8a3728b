use arrow::array::{Array, Float64Array, StringArray, UInt32Array, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use ebb_core::{FieldShape, SampleBatch, TimeSchedule, F};
use ebb_sampler::SampleSpec;
use parquet::arrow::ArrowWriter;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

pub mod cli;
pub mod render;

pub use cli::*;

/// Everything needed to reproduce one sampling run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub timestamp: String,
    pub seed: u64,
    pub model_name: String,
    pub model_params: serde_json::Value,
    pub stepper: String,
    pub num_steps: usize,
    pub eps: F,
    pub dt: F,
    pub batch_size: usize,
    pub shape: FieldShape,
    pub commit_hash: Option<String>,
    pub rust_version: String,
}

impl RunManifest {
    pub fn new(
        seed: u64,
        model_name: &str,
        model_params: serde_json::Value,
        stepper: &str,
        spec: &SampleSpec,
        schedule: &TimeSchedule,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            seed,
            model_name: model_name.to_string(),
            model_params,
            stepper: stepper.to_string(),
            num_steps: spec.num_steps,
            eps: spec.eps,
            dt: schedule.dt(),
            batch_size: spec.batch_size,
            shape: spec.shape,
            commit_hash: get_git_commit(),
            rust_version: get_rust_version(),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let manifest = serde_json::from_str(&json)?;
        Ok(manifest)
    }
}

/// Long-format Parquet table of sampled fields, one row per grid value
pub struct SampleWriter {
    writer: ArrowWriter<File>,
    schema: Arc<Schema>,
}

impl SampleWriter {
    pub fn new(file_path: &Path) -> anyhow::Result<Self> {
        let file = File::create(file_path)?;

        let fields = vec![
            Field::new("run_id", DataType::Utf8, false),
            Field::new("sample", DataType::UInt64, false),
            Field::new("channel", DataType::UInt32, false),
            Field::new("row", DataType::UInt32, false),
            Field::new("col", DataType::UInt32, false),
            Field::new("value", DataType::Float64, false),
        ];
        let schema = Arc::new(Schema::new(fields));
        let writer = ArrowWriter::try_new(file, schema.clone(), None)?;

        Ok(Self { writer, schema })
    }

    pub fn write_batch(
        &mut self,
        batch: &SampleBatch,
        manifest: &RunManifest,
    ) -> anyhow::Result<()> {
        let shape = batch.shape;
        let n_rows = batch.batch_size() * shape.len();
        if n_rows == 0 {
            return Ok(());
        }

        let mut run_ids = Vec::with_capacity(n_rows);
        let mut samples = Vec::with_capacity(n_rows);
        let mut channels = Vec::with_capacity(n_rows);
        let mut rows = Vec::with_capacity(n_rows);
        let mut cols = Vec::with_capacity(n_rows);
        let mut values = Vec::with_capacity(n_rows);

        for sample in 0..batch.batch_size() {
            for channel in 0..shape.channels {
                for row in 0..shape.height {
                    for col in 0..shape.width {
                        run_ids.push(manifest.run_id.clone());
                        samples.push(sample as u64);
                        channels.push(channel as u32);
                        rows.push(row as u32);
                        cols.push(col as u32);
                        values.push(batch.value(sample, channel, row, col));
                    }
                }
            }
        }

        let arrays: Vec<Arc<dyn Array>> = vec![
            Arc::new(StringArray::from(run_ids)),
            Arc::new(UInt64Array::from(samples)),
            Arc::new(UInt32Array::from(channels)),
            Arc::new(UInt32Array::from(rows)),
            Arc::new(UInt32Array::from(cols)),
            Arc::new(Float64Array::from(values)),
        ];

        let record = RecordBatch::try_new(self.schema.clone(), arrays)?;
        self.writer.write(&record)?;
        Ok(())
    }

    pub fn close(self) -> anyhow::Result<()> {
        self.writer.close()?;
        Ok(())
    }
}

/// Write a sampled batch to Parquet with its manifest alongside
pub fn write_batch_with_manifest(
    batch: &SampleBatch,
    manifest: &RunManifest,
    parquet_path: &Path,
    manifest_path: &Path,
) -> anyhow::Result<()> {
    let mut writer = SampleWriter::new(parquet_path)?;
    writer.write_batch(batch, manifest)?;
    writer.close()?;

    manifest.save_to_file(manifest_path)?;

    println!(
        "Wrote {} samples to {}",
        batch.batch_size(),
        parquet_path.display()
    );
    println!("Wrote manifest to {}", manifest_path.display());

    Ok(())
}

fn get_git_commit() -> Option<String> {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}

fn get_rust_version() -> String {
    std::process::Command::new("rustc")
        .arg("--version")
        .output()
        .ok()
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
