use crate::core::waveform::WaveformTable;
use serde::{Deserialize, Serialize};

/// How a voice's phase comes back into range after passing 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseWrap {
    /// Snap back to exactly 0, dropping whatever overshot 1. Step sizes that do
    /// not divide 1 evenly come out slightly flat.
    #[default]
    Reset,
    /// Keep the overshoot (modulo 1). More accurate pitch than `Reset`.
    Wrap,
}

/// A single oscillator reading a waveform table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub phase_step: f32,
    pub phase: f32,
    pub gain: f32,
    pub note: Option<u8>,
}

impl Voice {
    /// The main tone voice, which has no note identity.
    pub fn main(phase_step: f32, gain: f32) -> Self {
        Self {
            phase_step,
            phase: 0.0,
            gain,
            note: None,
        }
    }

    pub fn note(note: u8, phase_step: f32, gain: f32) -> Self {
        Self {
            phase_step,
            phase: 0.0,
            gain,
            note: Some(note),
        }
    }

    /// Current sample of this voice, before master gain. A failed lookup is
    /// silence.
    pub fn sample(&self, table: &WaveformTable) -> f32 {
        table.lookup(self.phase).map_or(0.0, |value| value * self.gain)
    }

    pub fn advance(&mut self, wrap: PhaseWrap) {
        self.phase += self.phase_step;
        if self.phase > 1.0 {
            self.phase = match wrap {
                PhaseWrap::Reset => 0.0,
                PhaseWrap::Wrap => self.phase.fract(),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_discards_overshoot() {
        let mut voice = Voice::main(0.4, 1.0);
        voice.advance(PhaseWrap::Reset);
        voice.advance(PhaseWrap::Reset);
        assert!((voice.phase - 0.8).abs() < 1e-6);
        voice.advance(PhaseWrap::Reset);
        assert_eq!(voice.phase, 0.0);
    }

    #[test]
    fn wrap_keeps_overshoot() {
        let mut voice = Voice::main(0.4, 1.0);
        for _ in 0..3 {
            voice.advance(PhaseWrap::Wrap);
        }
        assert!((voice.phase - 0.2).abs() < 1e-5, "phase {}", voice.phase);
    }

    #[test]
    fn phase_of_exactly_one_is_kept() {
        let mut voice = Voice::main(0.5, 1.0);
        voice.advance(PhaseWrap::Reset);
        voice.advance(PhaseWrap::Reset);
        assert_eq!(voice.phase, 1.0);
        voice.advance(PhaseWrap::Reset);
        assert_eq!(voice.phase, 0.0);
    }

    #[test]
    fn sample_scales_by_gain() {
        let table = crate::core::waveform::shapes::saw();
        let mut voice = Voice::note(60, 0.0, 0.5);
        voice.phase = 0.75;
        assert!((voice.sample(&table) - 0.25).abs() < 1e-6);
    }
}
