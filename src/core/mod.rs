pub mod audio;
pub mod bank;
pub mod engine;
pub mod midi;
pub mod voice;
pub mod waveform;

pub use engine::{Engine, EngineConfig, EngineMode};
