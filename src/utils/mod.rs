pub mod helpers;

pub use helpers::{format_frequency, midi_note_to_freq};
