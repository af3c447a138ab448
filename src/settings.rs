use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::engine::{EngineConfig, DEFAULT_FREQUENCY, DEFAULT_VOLUME, MONO_GAIN, POLY_GAIN};
use crate::core::voice::PhaseWrap;
use crate::core::waveform::shapes::Shape;
use crate::messaging::DEFAULT_QUEUE_CAPACITY;

const APP_DIR: &str = "hear-waveform";
const SETTINGS_FILE: &str = "settings.json";

/// User settings, stored as JSON in the platform config directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Requested output sample rate; the device default when unset
    pub sample_rate: Option<u32>,
    /// Requested device buffer size in frames; the device default when unset
    pub block_size: Option<u32>,
    pub queue_capacity: usize,
    pub main_frequency: f32,
    pub main_volume: f32,
    pub mono_gain: f32,
    pub poly_gain: f32,
    pub phase_wrap: PhaseWrap,
    /// Part of the MIDI input port name to connect to; first port when unset
    pub midi_port: Option<String>,
    pub shape: Shape,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_rate: None,
            block_size: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            main_frequency: DEFAULT_FREQUENCY,
            main_volume: DEFAULT_VOLUME,
            mono_gain: MONO_GAIN,
            poly_gain: POLY_GAIN,
            phase_wrap: PhaseWrap::Reset,
            midi_port: None,
            shape: Shape::Silence,
        }
    }
}

impl Settings {
    pub fn settings_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dir.join(APP_DIR))
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::settings_dir()?.join(SETTINGS_FILE))
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = File::open(path)
            .with_context(|| format!("Failed to open settings file {}", path.display()))?;
        let settings = serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
        Ok(settings)
    }

    /// Load from the default location, falling back to defaults on any error.
    pub fn load_or_default() -> Self {
        let path = match Self::default_path() {
            Ok(path) => path,
            Err(err) => {
                warn!("{err}; using default settings");
                return Self::default();
            }
        };
        match Self::load_from(&path) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                warn!("{err:#}; using default settings");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create settings directory")?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        let mut file = File::create(path).context("Failed to create settings file")?;
        file.write_all(json.as_bytes())
            .context("Failed to write settings data")?;
        Ok(())
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::default_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn engine_config(&self, sample_rate: f32) -> EngineConfig {
        EngineConfig {
            sample_rate,
            main_frequency: if self.main_frequency.is_finite() && self.main_frequency > 0.0 {
                self.main_frequency
            } else {
                warn!(
                    "Ignoring main_frequency {}; using {DEFAULT_FREQUENCY} Hz",
                    self.main_frequency
                );
                DEFAULT_FREQUENCY
            },
            main_volume: self.main_volume.clamp(0.0, 1.0),
            mono_gain: self.mono_gain,
            poly_gain: self.poly_gain,
            phase_wrap: self.phase_wrap,
            queue_capacity: self.queue_capacity,
        }
    }
}
