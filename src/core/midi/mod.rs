//! MIDI note input for the voice bank.

mod input;

pub use input::MidiInputHandler;

use crate::messaging::EngineCommand;
use crate::utils::midi_note_to_freq;

const NOTE_OFF: u8 = 0x80;
const NOTE_ON: u8 = 0x90;

/// Translate one raw MIDI message into an engine command.
///
/// MIDI channels 0-15 land on note channels 1-16. Velocity maps linearly onto
/// volume. A note-on with velocity 0 is a note-off. Messages other than note
/// on/off yield `None`.
pub fn translate(message: &[u8]) -> Option<EngineCommand> {
    let (&status, data) = message.split_first()?;
    let channel = (status & 0x0F) + 1;

    match (status & 0xF0, data) {
        (NOTE_ON, &[note, velocity, ..]) if velocity > 0 => Some(EngineCommand::NoteOn {
            channel,
            note,
            frequency: midi_note_to_freq(note),
            volume: velocity as f32 / 127.0,
        }),
        (NOTE_ON, &[note, _, ..]) | (NOTE_OFF, &[note, _, ..]) => {
            Some(EngineCommand::NoteOff { channel, note })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_maps_channel_and_pitch() {
        let cmd = translate(&[0x93, 69, 127]).unwrap();
        assert_eq!(
            cmd,
            EngineCommand::NoteOn { channel: 4, note: 69, frequency: 440.0, volume: 1.0 }
        );
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        assert_eq!(
            translate(&[0x90, 60, 0]),
            Some(EngineCommand::NoteOff { channel: 1, note: 60 })
        );
    }

    #[test]
    fn note_off_on_last_channel() {
        assert_eq!(
            translate(&[0x8F, 72, 64]),
            Some(EngineCommand::NoteOff { channel: 16, note: 72 })
        );
    }

    #[test]
    fn other_messages_are_ignored() {
        assert_eq!(translate(&[0xB0, 7, 100]), None); // control change
        assert_eq!(translate(&[0xE0, 0, 64]), None); // pitch bend
        assert_eq!(translate(&[0x90, 60]), None); // truncated
        assert_eq!(translate(&[]), None);
    }

    #[test]
    fn translated_commands_pass_validation() {
        for status in 0x90..=0x9F {
            let cmd = translate(&[status, 0, 1]).unwrap();
            assert!(cmd.validated().is_ok());
        }
    }
}
