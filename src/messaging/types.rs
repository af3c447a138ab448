use crate::core::bank::NOTE_CHANNELS;
use crate::core::waveform::{WaveformError, WaveformTable};
use std::fmt;

/// Commands from the control side to the engine, applied at the start of the
/// next rendered block in the order they were sent.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    ReplaceWaveform(WaveformTable),
    /// Main tone frequency in Hz
    SetMainFrequency(f32),
    /// Main tone volume, 0.0 to 1.0
    SetMainVolume(f32),
    NoteOn {
        channel: u8, // 1..=16
        note: u8,
        frequency: f32,
        volume: f32,
    },
    NoteOff {
        channel: u8,
        note: u8,
    },
    ResetMonophonic,
}

impl EngineCommand {
    /// Check a command before it is queued. Volumes are clamped into range;
    /// anything else out of range is an error.
    pub fn validated(self) -> Result<Self, CommandError> {
        match self {
            EngineCommand::SetMainFrequency(frequency) => {
                check_frequency(frequency)?;
                Ok(self)
            }
            EngineCommand::SetMainVolume(volume) => {
                Ok(EngineCommand::SetMainVolume(check_volume(volume)?))
            }
            EngineCommand::NoteOn { channel, note, frequency, volume } => {
                check_channel(channel)?;
                check_frequency(frequency)?;
                Ok(EngineCommand::NoteOn {
                    channel,
                    note,
                    frequency,
                    volume: check_volume(volume)?,
                })
            }
            EngineCommand::NoteOff { channel, .. } => {
                check_channel(channel)?;
                Ok(self)
            }
            EngineCommand::ReplaceWaveform(_) | EngineCommand::ResetMonophonic => Ok(self),
        }
    }
}

fn check_frequency(frequency: f32) -> Result<(), CommandError> {
    if frequency.is_finite() && frequency > 0.0 {
        Ok(())
    } else {
        Err(CommandError::InvalidFrequency(frequency))
    }
}

fn check_volume(volume: f32) -> Result<f32, CommandError> {
    if volume.is_finite() {
        Ok(volume.clamp(0.0, 1.0))
    } else {
        Err(CommandError::InvalidVolume(volume))
    }
}

fn check_channel(channel: u8) -> Result<(), CommandError> {
    if (1..=NOTE_CHANNELS as u8).contains(&channel) {
        Ok(())
    } else {
        Err(CommandError::InvalidChannel(channel))
    }
}

/// Reasons a command never reached the engine
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    InvalidWaveform(WaveformError),
    InvalidFrequency(f32),
    InvalidVolume(f32),
    InvalidChannel(u8),
    /// The queue is at capacity; the command was dropped
    QueueFull,
    /// The engine has been dropped
    Disconnected,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::InvalidWaveform(e) => write!(f, "invalid waveform: {e}"),
            CommandError::InvalidFrequency(hz) => {
                write!(f, "frequency must be a positive number of Hz, got {hz}")
            }
            CommandError::InvalidVolume(v) => write!(f, "volume must be a finite number, got {v}"),
            CommandError::InvalidChannel(ch) => {
                write!(f, "note channel must be 1..={NOTE_CHANNELS}, got {ch}")
            }
            CommandError::QueueFull => write!(f, "command queue is full, command dropped"),
            CommandError::Disconnected => write!(f, "engine is no longer running"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::InvalidWaveform(e) => Some(e),
            _ => None,
        }
    }
}

impl From<WaveformError> for CommandError {
    fn from(e: WaveformError) -> Self {
        CommandError::InvalidWaveform(e)
    }
}
