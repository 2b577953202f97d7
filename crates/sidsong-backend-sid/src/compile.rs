//! Song compilation: validated [`Song`] in, hardware-ready tables out.

use sidsong_spec::{Octave, Song};

use crate::filter::FilterConfig;
use crate::note::{ticks_per_beat, FrequencyTable};
use crate::pattern::{CompiledVoice, NoteCode};

/// Everything the code generator consumes. Holds no reference back to the
/// source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSong {
    pub bpm: u16,
    pub ticks_per_beat: u32,
    pub voices: [CompiledVoice; 3],
    pub filter: FilterConfig,
    pub frequencies: FrequencyTable,
}

impl CompiledSong {
    pub fn compile(song: &Song) -> Self {
        let bpm = song.tempo.bpm();
        let voices = [
            CompiledVoice::compile(&song.voices[0], bpm),
            CompiledVoice::compile(&song.voices[1], bpm),
            CompiledVoice::compile(&song.voices[2], bpm),
        ];
        let filter = FilterConfig::reconcile(&voices);
        let ticks_per_beat = ticks_per_beat(bpm);
        log::debug!("{} BPM -> {} ticks per beat", bpm, ticks_per_beat);

        Self {
            bpm,
            ticks_per_beat,
            voices,
            filter,
            frequencies: FrequencyTable::new(),
        }
    }

    /// Frequency word the voice plays at the given step, `None` for a rest.
    pub fn frequency_at(&self, voice: usize, step: usize) -> Option<u16> {
        let v = self.voices.get(voice)?;
        match *v.notes.get(step)? {
            NoteCode::Rest => None,
            NoteCode::Pitch(pitch) => {
                let octave = Octave::new(v.octaves[step])?;
                Some(self.frequencies.word(pitch, octave))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{json, Value};

    pub(crate) fn voice_doc(role: &str, waveform: &str, step: Value) -> Value {
        json!({
            "role": role,
            "waveform": waveform,
            "adsr": {"attack": 0, "decay": 9, "sustain": 0, "release": 0},
            "filter": {"type": "NONE", "cutoff": 0, "resonance": 0},
            "pattern": vec![step; 64],
        })
    }

    pub(crate) fn sample_doc() -> Value {
        let rest = json!({"note": "REST", "octave": 0, "duration": 4});
        json!({
            "bpm": 120,
            "key": "C",
            "scale": "major",
            "voices": [
                voice_doc("LEAD", "TRI", json!({"note": "C", "octave": 4, "duration": 4})),
                voice_doc("BASS", "SAW", rest.clone()),
                voice_doc("ARP_OR_DRUMS", "NOISE", rest),
            ],
        })
    }

    pub(crate) fn sample_song() -> CompiledSong {
        let song = sidsong_spec::validate_song(&sample_doc()).unwrap();
        CompiledSong::compile(&song)
    }

    #[test]
    fn test_compile_sample() {
        let song = sample_song();
        assert_eq!(song.ticks_per_beat, 25);
        assert_eq!(song.voices[0].len(), 64);
        assert_eq!(song.voices[0].init_step, 0);
        assert_eq!(song.voices[1].init_step, 0);
        assert!(!song.voices[1].has_audible_step());
        assert_eq!(song.voices[0].registers.attack_decay, 0x09);
        assert_eq!(song.voices[2].registers.control, 0x80);
        assert!(!song.filter.is_active());
    }

    #[test]
    fn test_middle_c_at_step_zero() {
        let song = sample_song();
        assert_eq!(song.frequency_at(0, 0), Some(4455));
        assert_eq!(song.frequency_at(1, 0), None);
        assert_eq!(song.frequency_at(3, 0), None);
    }

    #[test]
    fn test_first_audible_step_skips_leading_rests() {
        let mut doc = sample_doc();
        for i in 0..5 {
            doc["voices"][0]["pattern"][i] = json!({"note": "REST", "octave": 0, "duration": 16});
        }
        let song = CompiledSong::compile(&sidsong_spec::validate_song(&doc).unwrap());
        assert_eq!(song.voices[0].init_step, 5);
        assert_eq!(song.voices[0].ticks[0], 6);
    }

    #[test]
    fn test_filter_reconciled_from_voices() {
        let mut doc = sample_doc();
        doc["voices"][1]["filter"] = json!({"type": "LP", "cutoff": 1024, "resonance": 6});
        doc["voices"][2]["filter"] = json!({"type": "HP+BP", "cutoff": 512, "resonance": 12});
        let song = CompiledSong::compile(&sidsong_spec::validate_song(&doc).unwrap());
        assert_eq!(song.filter.routing, 0b110);
        assert_eq!(song.filter.mode, 0x70);
        assert_eq!(song.filter.resonance, 12);
        assert_eq!(song.filter.cutoff, 768);
    }
}
