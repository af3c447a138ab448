//! Real-time polyphonic oscillator built around a user-drawn waveform.
//!
//! The [`Engine`] owns the waveform and the voice bank and renders audio
//! blocks. Everything else talks to it through an [`EngineHandle`], which
//! queues commands that take effect at the start of the next block.

pub mod core;
pub mod messaging;
pub mod settings;
pub mod utils;

pub use crate::core::waveform::{ControlPoint, WaveformTable};
pub use crate::core::{Engine, EngineConfig, EngineMode};
pub use crate::messaging::{CommandError, EngineCommand, EngineHandle};
pub use crate::settings::Settings;
