use anyhow::{Context, Result};
use log::info;
use std::path::Path;

use crate::core::engine::Engine;

/// Render `seconds` of audio from `engine` into a mono 32-bit float WAV file.
/// Returns the number of frames written.
pub fn bounce_to_wav(
    engine: &mut Engine,
    seconds: f32,
    block_size: usize,
    path: &Path,
) -> Result<usize> {
    let sample_rate = engine.sample_rate();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: sample_rate.round() as u32,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let total = (seconds.max(0.0) * sample_rate).round() as usize;
    let mut block = vec![0.0f32; block_size.max(1)];
    let mut written = 0;
    while written < total {
        let frames = block.len().min(total - written);
        engine.render(&mut block[..frames]);
        for &sample in &block[..frames] {
            writer.write_sample(sample).context("Failed to write sample")?;
        }
        written += frames;
    }
    writer.finalize().context("Failed to finalize WAV file")?;

    info!("Bounced {written} frames to {}", path.display());
    Ok(written)
}
