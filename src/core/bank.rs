//! Channel layout: one main tone plus sixteen note channels.

use crate::core::voice::Voice;

/// Number of note channels, addressed as 1..=NOTE_CHANNELS.
pub const NOTE_CHANNELS: usize = 16;

/// Every distinct note id a channel can hold at once. Reserving this up front
/// means note-on never reallocates while rendering.
const VOICES_PER_CHANNEL: usize = u8::MAX as usize + 1;

pub struct VoiceBank {
    main: Voice,
    notes: [Vec<Voice>; NOTE_CHANNELS],
}

impl VoiceBank {
    pub fn new(main: Voice) -> Self {
        Self {
            main,
            notes: std::array::from_fn(|_| Vec::with_capacity(VOICES_PER_CHANNEL)),
        }
    }

    pub fn main(&self) -> &Voice {
        &self.main
    }

    /// Update the main tone in place. Its phase carries on so that knob moves
    /// don't click.
    pub fn set_main(&mut self, phase_step: f32, gain: f32) {
        self.main.phase_step = phase_step;
        self.main.gain = gain;
    }

    pub fn set_main_phase_step(&mut self, phase_step: f32) {
        self.main.phase_step = phase_step;
    }

    pub fn set_main_gain(&mut self, gain: f32) {
        self.main.gain = gain;
    }

    /// Start a note, or retune/re-level it without a phase reset if the
    /// channel already holds that note. Returns false for a channel outside
    /// 1..=16.
    pub fn note_on(&mut self, channel: u8, note: u8, phase_step: f32, gain: f32) -> bool {
        let Some(voices) = self.note_channel_mut(channel) else {
            return false;
        };
        match voices.iter_mut().find(|v| v.note == Some(note)) {
            Some(voice) => {
                voice.phase_step = phase_step;
                voice.gain = gain;
            }
            None => voices.push(Voice::note(note, phase_step, gain)),
        }
        true
    }

    /// Stop a note. Unknown notes and channels are ignored; note sources
    /// routinely send duplicate or stray offs.
    pub fn note_off(&mut self, channel: u8, note: u8) {
        if let Some(voices) = self.note_channel_mut(channel) {
            if let Some(index) = voices.iter().position(|v| v.note == Some(note)) {
                voices.swap_remove(index);
            }
        }
    }

    /// Drop every note voice, leaving only the main tone.
    pub fn reset_to_monophonic(&mut self) {
        for voices in &mut self.notes {
            voices.clear();
        }
    }

    /// Voices on `channel`: channel 0 is the main tone, 1..=16 are note
    /// channels. Out-of-range channels read as empty.
    pub fn channel(&self, channel: u8) -> &[Voice] {
        match channel {
            0 => std::slice::from_ref(&self.main),
            n => self
                .notes
                .get(n as usize - 1)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        }
    }

    /// Count of sounding voices, main tone included.
    pub fn active_voices(&self) -> usize {
        1 + self.notes.iter().map(Vec::len).sum::<usize>()
    }

    pub fn voices(&self) -> impl Iterator<Item = &Voice> {
        std::iter::once(&self.main).chain(self.notes.iter().flatten())
    }

    pub fn voices_mut(&mut self) -> impl Iterator<Item = &mut Voice> {
        std::iter::once(&mut self.main).chain(self.notes.iter_mut().flatten())
    }

    fn note_channel_mut(&mut self, channel: u8) -> Option<&mut Vec<Voice>> {
        let index = (channel as usize).checked_sub(1)?;
        self.notes.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> VoiceBank {
        VoiceBank::new(Voice::main(0.01, 0.5))
    }

    #[test]
    fn starts_with_only_main_voice() {
        let bank = bank();
        assert_eq!(bank.active_voices(), 1);
        assert_eq!(bank.channel(0).len(), 1);
        assert!((1..=16).all(|ch| bank.channel(ch).is_empty()));
    }

    #[test]
    fn set_main_keeps_phase() {
        let mut bank = bank();
        bank.voices_mut().next().unwrap().phase = 0.3;
        bank.set_main(0.02, 0.9);
        assert_eq!(bank.main().phase, 0.3);
        assert_eq!(bank.main().phase_step, 0.02);
        assert_eq!(bank.main().gain, 0.9);
    }

    #[test]
    fn note_on_then_off_empties_channel() {
        let mut bank = bank();
        assert!(bank.note_on(1, 60, 0.01, 0.5));
        assert_eq!(bank.channel(1).len(), 1);
        bank.note_off(1, 60);
        assert!(bank.channel(1).is_empty());
        assert_eq!(bank.active_voices(), 1);
    }

    #[test]
    fn retrigger_updates_in_place() {
        let mut bank = bank();
        bank.note_on(3, 64, 0.01, 0.5);
        for voice in bank.voices_mut().filter(|v| v.note.is_some()) {
            voice.phase = 0.6;
        }
        bank.note_on(3, 64, 0.02, 0.25);

        let voices = bank.channel(3);
        assert_eq!(voices.len(), 1);
        assert_eq!(voices[0].phase, 0.6);
        assert_eq!(voices[0].phase_step, 0.02);
        assert_eq!(voices[0].gain, 0.25);
    }

    #[test]
    fn same_note_on_different_channels_is_independent() {
        let mut bank = bank();
        bank.note_on(1, 60, 0.01, 0.5);
        bank.note_on(2, 60, 0.01, 0.5);
        bank.note_off(1, 60);
        assert!(bank.channel(1).is_empty());
        assert_eq!(bank.channel(2).len(), 1);
    }

    #[test]
    fn note_off_matches_by_id_not_position() {
        let mut bank = bank();
        bank.note_on(1, 60, 0.01, 0.5);
        bank.note_on(1, 64, 0.02, 0.5);
        bank.note_on(1, 67, 0.03, 0.5);
        bank.note_off(1, 64);

        let mut remaining: Vec<u8> = bank.channel(1).iter().filter_map(|v| v.note).collect();
        remaining.sort_unstable();
        assert_eq!(remaining, vec![60, 67]);
    }

    #[test]
    fn unknown_note_off_is_noop() {
        let mut bank = bank();
        bank.note_on(1, 60, 0.01, 0.5);
        bank.note_off(1, 61);
        bank.note_off(5, 60);
        bank.note_off(0, 60);
        bank.note_off(200, 60);
        assert_eq!(bank.active_voices(), 2);
    }

    #[test]
    fn out_of_range_channels_are_rejected() {
        let mut bank = bank();
        assert!(!bank.note_on(0, 60, 0.01, 0.5));
        assert!(!bank.note_on(17, 60, 0.01, 0.5));
        assert_eq!(bank.active_voices(), 1);
        assert!(bank.channel(17).is_empty());
    }

    #[test]
    fn every_note_id_fits_without_growth() {
        let mut bank = bank();
        let reserved = bank.notes[15].capacity();
        assert!(reserved >= VOICES_PER_CHANNEL);
        for note in 0..=u8::MAX {
            bank.note_on(16, note, 0.01, 0.1);
        }
        assert_eq!(bank.channel(16).len(), VOICES_PER_CHANNEL);
        assert_eq!(bank.notes[15].capacity(), reserved);
    }

    #[test]
    fn reset_clears_note_channels_only() {
        let mut bank = bank();
        for channel in 1..=16 {
            bank.note_on(channel, 60, 0.01, 0.5);
        }
        assert_eq!(bank.active_voices(), 17);
        bank.reset_to_monophonic();
        assert_eq!(bank.active_voices(), 1);
        assert_eq!(bank.main().phase_step, 0.01);
    }
}
