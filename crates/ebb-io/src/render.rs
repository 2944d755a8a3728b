use anyhow::Result;
use ebb_core::SampleBatch;
use image::imageops::FilterType;
use image::{GrayImage, Luma};
use std::fs;
use std::path::Path;

/// Write one grayscale PNG per (sample, channel) plane of a batch.
///
/// Each plane is normalized to its own min/max before quantization; a flat
/// plane renders mid-gray. `scale` upsamples with nearest-neighbor so small
/// grids stay inspectable.
pub fn save_channel_pngs(batch: &SampleBatch, dir: &Path, scale: u32) -> Result<()> {
    fs::create_dir_all(dir)?;
    let shape = batch.shape;

    for sample in 0..batch.batch_size() {
        for channel in 0..shape.channels {
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for row in 0..shape.height {
                for col in 0..shape.width {
                    let v = batch.value(sample, channel, row, col);
                    lo = lo.min(v);
                    hi = hi.max(v);
                }
            }
            let span = hi - lo;

            let mut img = GrayImage::new(shape.width as u32, shape.height as u32);
            for row in 0..shape.height {
                for col in 0..shape.width {
                    let v = batch.value(sample, channel, row, col);
                    let level = if span > 0.0 {
                        ((v - lo) / span * 255.0).round() as u8
                    } else {
                        128
                    };
                    img.put_pixel(col as u32, row as u32, Luma([level]));
                }
            }

            let img = if scale > 1 {
                image::imageops::resize(
                    &img,
                    shape.width as u32 * scale,
                    shape.height as u32 * scale,
                    FilterType::Nearest,
                )
            } else {
                img
            };

            let path = dir.join(format!("sample{:03}_c{}.png", sample, channel));
            img.save(&path)?;
        }
    }
    Ok(())
}
