//! Note, tempo and frequency conversion against the PAL C64 hardware.
//!
//! Two fixed hardware facts drive everything here: the SID oscillators count
//! at the PAL system clock, and the player is called from a 50 Hz interrupt.

use sidsong_spec::{Duration, Octave, PitchClass};

/// PAL C64 system clock in Hz.
pub const PAL_CLOCK_HZ: u32 = 985_248;

/// Player call rate in Hz (one raster interrupt per PAL frame).
pub const TICK_RATE_HZ: u32 = 50;

/// Lowest octave in the frequency table.
pub const TABLE_MIN_OCTAVE: u8 = Octave::MIN;

/// Number of octaves in the frequency table.
pub const TABLE_OCTAVES: usize = (Octave::MAX - Octave::MIN + 1) as usize;

/// Number of entries in the frequency table.
pub const TABLE_LEN: usize = TABLE_OCTAVES * 12;

/// Scheduler ticks spent on one beat at the given tempo, never less than 1.
///
/// # Examples
/// ```
/// use sidsong_backend_sid::note::ticks_per_beat;
///
/// assert_eq!(ticks_per_beat(120), 25);
/// assert_eq!(ticks_per_beat(140), 21);
/// ```
pub fn ticks_per_beat(bpm: u16) -> u32 {
    let ticks = (TICK_RATE_HZ as f64 * 60.0 / bpm.max(1) as f64).round();
    (ticks as u32).max(1)
}

/// Scheduler ticks spent on one step of the given duration, never less than 1.
///
/// The fraction is applied to the already-rounded beat length, so an eighth at
/// 120 BPM is `round(25 * 0.5) = 13`.
pub fn ticks_for(bpm: u16, duration: Duration) -> u32 {
    let ticks = (ticks_per_beat(bpm) as f64 * duration.beats()).round();
    (ticks as u32).max(1)
}

/// MIDI note number of a pitch class in an octave (C4 = 60).
pub fn midi_number(pitch: PitchClass, octave: u8) -> u8 {
    12 * (octave + 1) + pitch.index()
}

/// Convert a MIDI note number to frequency in Hz.
///
/// Uses the standard formula: f = 440 * 2^((n-69)/12)
pub fn midi_to_freq(midi_note: u8) -> f64 {
    440.0 * 2.0_f64.powf((midi_note as f64 - 69.0) / 12.0)
}

/// SID oscillator frequency word for a frequency in Hz.
///
/// The SID adds the 16-bit word to a 24-bit accumulator once per clock, so
/// the word is `f * 2^24 / clock`, clamped to 16 bits.
pub fn freq_to_word(freq: f64) -> u16 {
    let word = (freq * (1u32 << 24) as f64 / PAL_CLOCK_HZ as f64).round();
    word.clamp(0.0, u16::MAX as f64) as u16
}

/// SID frequency word for a pitch class in an octave.
///
/// # Examples
/// ```
/// use sidsong_backend_sid::note::frequency_word;
/// use sidsong_spec::PitchClass;
///
/// // Middle C
/// assert_eq!(frequency_word(PitchClass::C, 4), 4455);
/// // A4 = 440 Hz
/// assert_eq!(frequency_word(PitchClass::A, 4), 7493);
/// ```
pub fn frequency_word(pitch: PitchClass, octave: u8) -> u16 {
    freq_to_word(midi_to_freq(midi_number(pitch, octave)))
}

/// The 48-entry table of frequency words for octaves 2-5, shared by all voices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    words: [u16; TABLE_LEN],
}

impl FrequencyTable {
    /// Compute the table from the PAL clock.
    pub fn new() -> Self {
        let mut words = [0u16; TABLE_LEN];
        for (octave_idx, row) in words.chunks_mut(12).enumerate() {
            let octave = TABLE_MIN_OCTAVE + octave_idx as u8;
            for (pitch, word) in PitchClass::ALL.iter().zip(row.iter_mut()) {
                *word = frequency_word(*pitch, octave);
            }
        }
        Self { words }
    }

    /// Table index of a pitch: `(octave - 2) * 12 + pitch`.
    pub fn index(pitch: PitchClass, octave: Octave) -> usize {
        (octave.get() - TABLE_MIN_OCTAVE) as usize * 12 + pitch.index() as usize
    }

    pub fn word(&self, pitch: PitchClass, octave: Octave) -> u16 {
        self.words[Self::index(pitch, octave)]
    }

    pub fn words(&self) -> &[u16; TABLE_LEN] {
        &self.words
    }

    /// Low bytes of every word, in table order.
    pub fn lo_bytes(&self) -> Vec<u8> {
        self.words.iter().map(|w| (w & 0xFF) as u8).collect()
    }

    /// High bytes of every word, in table order.
    pub fn hi_bytes(&self) -> Vec<u8> {
        self.words.iter().map(|w| (w >> 8) as u8).collect()
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidsong_spec::Tempo;

    #[test]
    fn test_ticks_at_120_bpm() {
        assert_eq!(ticks_per_beat(120), 25);
        assert_eq!(ticks_for(120, Duration::Quarter), 25);
        assert_eq!(ticks_for(120, Duration::Eighth), 13);
        assert_eq!(ticks_for(120, Duration::Sixteenth), 6);
    }

    #[test]
    fn test_ticks_are_positive_for_every_tempo() {
        for tempo in Tempo::ALL {
            for duration in Duration::ALL {
                let ticks = ticks_for(tempo.bpm(), duration);
                assert!(ticks >= 1);
                assert!(ticks <= u8::MAX as u32);
            }
        }
    }

    #[test]
    fn test_ticks_floor_at_one() {
        assert_eq!(ticks_per_beat(u16::MAX), 1);
        assert_eq!(ticks_for(u16::MAX, Duration::Sixteenth), 1);
    }

    #[test]
    fn test_midi_numbers() {
        assert_eq!(midi_number(PitchClass::C, 4), 60);
        assert_eq!(midi_number(PitchClass::A, 4), 69);
        assert_eq!(midi_number(PitchClass::B, 5), 83);
    }

    #[test]
    fn test_middle_c_word() {
        let expected = (440.0 * 2f64.powf(-9.0 / 12.0) * 16_777_216.0 / 985_248.0).round() as u16;
        assert_eq!(frequency_word(PitchClass::C, 4), expected);
        assert_eq!(expected, 0x1167);
    }

    #[test]
    fn test_table_layout() {
        let table = FrequencyTable::new();
        let c2 = Octave::new(2).unwrap();
        let b5 = Octave::new(5).unwrap();
        assert_eq!(FrequencyTable::index(PitchClass::C, c2), 0);
        assert_eq!(FrequencyTable::index(PitchClass::B, b5), 47);
        assert_eq!(table.word(PitchClass::C, c2), 1114);
        assert_eq!(table.word(PitchClass::B, b5), 16820);
        assert_eq!(table.lo_bytes().len(), TABLE_LEN);
        assert_eq!(table.hi_bytes()[47], (16820u16 >> 8) as u8);
    }
}
