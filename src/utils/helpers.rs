/// Convert a MIDI note number to its frequency in Hz (equal temperament, A4 = 440 Hz)
pub fn midi_note_to_freq(note: u8) -> f32 {
    const A4_MIDI: f32 = 69.0;
    const A4_FREQ: f32 = 440.0;

    A4_FREQ * 2.0f32.powf((note as f32 - A4_MIDI) / 12.0)
}

/// Format a frequency value with appropriate unit suffix (Hz, kHz)
pub fn format_frequency(freq: f32) -> String {
    if freq >= 1000.0 {
        format!("{:.2} kHz", freq / 1000.0)
    } else {
        format!("{:.1} Hz", freq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert_eq!(midi_note_to_freq(69), 440.0);
        assert!((midi_note_to_freq(81) - 880.0).abs() < 1e-3);
        assert!((midi_note_to_freq(60) - 261.6256).abs() < 1e-3);
    }

    #[test]
    fn formats_units() {
        assert_eq!(format_frequency(440.0), "440.0 Hz");
        assert_eq!(format_frequency(12500.0), "12.50 kHz");
    }
}
