//! Device output: drives the engine from the audio callback.

mod bounce;

pub use bounce::bounce_to_wav;

use anyhow::{anyhow, bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, FromSample, SampleFormat, SampleRate, SizedSample, Stream, StreamConfig};
use log::{error, info};

use crate::core::engine::Engine;
use crate::messaging::EngineHandle;
use crate::settings::Settings;

/// Largest mono block rendered in one go; device buffers are split into
/// chunks of at most this many frames.
pub const MAX_BLOCK_FRAMES: usize = 4096;

/// A running output stream with the engine living inside its callback.
pub struct AudioOutput {
    _stream: Stream,
    sample_rate: u32,
    channels: u16,
}

impl AudioOutput {
    /// Open the default output device, build an engine for its sample rate and
    /// start playback. Returns the control handle for that engine.
    pub fn start(settings: &Settings) -> Result<(Self, EngineHandle)> {
        let host = cpal::default_host();
        info!("Using audio host: {}", host.id().name());

        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No output device available"))?;
        info!("Using output device: {}", device.name().unwrap_or_else(|_| "<unnamed>".into()));

        let default_config = device
            .default_output_config()
            .context("Failed to query default output config")?;
        let sample_format = default_config.sample_format();
        let mut config = StreamConfig::from(default_config);
        if let Some(rate) = settings.sample_rate {
            config.sample_rate = SampleRate(rate);
        }
        if let Some(frames) = settings.block_size {
            config.buffer_size = BufferSize::Fixed(frames);
        }
        info!(
            "Stream config: {} Hz, {} channel(s), {:?} buffer, {:?}",
            config.sample_rate.0, config.channels, config.buffer_size, sample_format
        );

        let (engine, handle) = Engine::new(settings.engine_config(config.sample_rate.0 as f32));

        let stream = match sample_format {
            SampleFormat::F32 => create_stream::<f32>(&device, &config, engine),
            SampleFormat::I16 => create_stream::<i16>(&device, &config, engine),
            SampleFormat::U16 => create_stream::<u16>(&device, &config, engine),
            other => bail!("Unsupported sample format {other:?}"),
        }?;
        stream.play().context("Failed to start output stream")?;
        info!("Audio stream started");

        Ok((
            AudioOutput {
                _stream: stream,
                sample_rate: config.sample_rate.0,
                channels: config.channels,
            },
            handle,
        ))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

fn create_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut engine: Engine,
) -> Result<Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels.max(1) as usize;
    let mut scratch = vec![0.0f32; MAX_BLOCK_FRAMES];
    let err_fn = |err| error!("An error occurred on the audio stream: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            write_interleaved(data, channels, &mut scratch, &mut engine);
        },
        err_fn,
        None,
    )?;
    Ok(stream)
}

/// Render mono blocks into `scratch` and copy each sample to every channel of
/// the interleaved device buffer.
fn write_interleaved<T>(data: &mut [T], channels: usize, scratch: &mut [f32], engine: &mut Engine)
where
    T: SizedSample + FromSample<f32>,
{
    for chunk in data.chunks_mut(channels * scratch.len()) {
        let block = &mut scratch[..chunk.len() / channels];
        engine.render(block);
        for (frame, &value) in chunk.chunks_mut(channels).zip(block.iter()) {
            let value = T::from_sample(value);
            for sample in frame.iter_mut() {
                *sample = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpal::Sample;

    use crate::core::engine::EngineConfig;
    use crate::core::waveform::{ControlPoint, WaveformTable};
    use crate::messaging::EngineCommand;

    fn dc_engine() -> Engine {
        let (mut engine, _handle) = Engine::new(EngineConfig {
            main_volume: 1.0,
            ..EngineConfig::new(48000.0)
        });
        let flat = WaveformTable::new(vec![ControlPoint::new(0.0, 0.5)]).unwrap();
        engine.apply(EngineCommand::ReplaceWaveform(flat));
        engine
    }

    #[test]
    fn copies_mono_to_every_channel() {
        let mut engine = dc_engine();
        let mut scratch = vec![0.0; 16];
        let mut data = vec![0.0f32; 3 * 10];
        write_interleaved(&mut data, 3, &mut scratch, &mut engine);
        assert!(data.iter().all(|&s| (s - 0.25).abs() < 1e-6), "{data:?}");
    }

    #[test]
    fn splits_large_buffers_into_chunks() {
        let mut engine = dc_engine();
        let mut scratch = vec![0.0; 4];
        let mut data = vec![0i16; 2 * 11];
        write_interleaved(&mut data, 2, &mut scratch, &mut engine);
        let expected = i16::from_sample(0.25f32);
        assert!(data.iter().all(|&s| s == expected), "{data:?}");
    }
}
