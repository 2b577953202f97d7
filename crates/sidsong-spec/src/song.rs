//! Validated song document types.
//!
//! A [`Song`] can only be obtained through [`crate::validation::validate_song`]
//! (or [`Song::from_json`]), so every value reachable from it has already been
//! checked against the enumeration catalog and the length rules.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::catalog::{
    Duration, FilterType, Nibble, Octave, PitchClass, Role, Scale, Tempo, Waveform,
};
use crate::error::SpecError;

/// Number of voices in every song.
pub const VOICE_COUNT: usize = 3;

/// Minimum number of steps in a flat pattern.
pub const MIN_PATTERN_STEPS: usize = 64;

/// Maximum number of steps in a flat pattern.
pub const MAX_PATTERN_STEPS: usize = 192;

/// Exact number of steps in each pattern section.
pub const SECTION_STEPS: usize = 16;

/// Root song document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Song {
    #[serde(rename = "bpm")]
    pub tempo: Tempo,
    pub key: PitchClass,
    pub scale: Scale,
    pub voices: [Voice; VOICE_COUNT],
    pub title: String,
    pub author: String,
    pub released: String,
}

impl Song {
    /// Parses and validates a song from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Ok(crate::validation::validate_song(&value)?)
    }

    /// Reads, parses and validates a song document from disk.
    pub fn from_path(path: &std::path::Path) -> Result<Self, SpecError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Metadata fields carried into the packaged binary.
    pub fn metadata(&self) -> SongMetadata<'_> {
        SongMetadata {
            title: &self.title,
            author: &self.author,
            released: &self.released,
        }
    }
}

/// Borrowed free-text metadata of a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SongMetadata<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub released: &'a str,
}

/// One of the three synthesizer voices.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    pub role: Role,
    pub waveform: Waveform,
    pub adsr: Adsr,
    /// 12-bit pulse width; present exactly when the waveform is `PULSE`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse_width: Option<u16>,
    pub filter: FilterRequest,
    #[serde(flatten)]
    pub pattern: PatternSource,
}

impl Voice {
    /// The voice's final step list, sections concatenated in fixed order.
    pub fn steps(&self) -> Vec<Step> {
        self.pattern.steps()
    }
}

/// Envelope stages, one nibble each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Adsr {
    pub attack: Nibble,
    pub decay: Nibble,
    pub sustain: Nibble,
    pub release: Nibble,
}

/// A voice's wish for the shared hardware filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterRequest {
    #[serde(rename = "type")]
    pub kind: FilterType,
    /// 11-bit cutoff (0-2047).
    pub cutoff: u16,
    pub resonance: Nibble,
}

/// The two accepted pattern shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PatternSource {
    /// A flat pattern of 64-192 steps.
    #[serde(rename = "pattern")]
    Flat(Vec<Step>),
    /// Three 16-step sections played intro, development, cadence.
    #[serde(rename = "patternSections")]
    Sections(PatternSections),
}

impl PatternSource {
    pub fn steps(&self) -> Vec<Step> {
        match self {
            PatternSource::Flat(steps) => steps.clone(),
            PatternSource::Sections(sections) => sections
                .intro
                .iter()
                .chain(&sections.development)
                .chain(&sections.cadence)
                .copied()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PatternSource::Flat(steps) => steps.len(),
            PatternSource::Sections(_) => SECTION_STEPS * 3,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternSections {
    pub intro: Vec<Step>,
    pub development: Vec<Step>,
    pub cadence: Vec<Step>,
}

/// What a step sounds: silence, or a pitch in a given octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepNote {
    Rest,
    Pitch { pitch: PitchClass, octave: Octave },
}

impl StepNote {
    pub fn is_rest(&self) -> bool {
        matches!(self, StepNote::Rest)
    }
}

/// One pattern entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    pub note: StepNote,
    pub duration: Duration,
}

impl Step {
    pub fn rest(duration: Duration) -> Self {
        Self {
            note: StepNote::Rest,
            duration,
        }
    }

    pub fn pitch(pitch: PitchClass, octave: Octave, duration: Duration) -> Self {
        Self {
            note: StepNote::Pitch { pitch, octave },
            duration,
        }
    }
}

impl Serialize for Step {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (note, octave) = match self.note {
            StepNote::Rest => ("REST", 0),
            StepNote::Pitch { pitch, octave } => (pitch.as_str(), octave.get()),
        };
        let mut state = serializer.serialize_struct("Step", 3)?;
        state.serialize_field("note", note)?;
        state.serialize_field("octave", &octave)?;
        state.serialize_field("duration", &self.duration)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn octave(value: u8) -> Octave {
        Octave::new(value).unwrap()
    }

    #[test]
    fn test_sections_concatenate_in_order() {
        let section = |pitch| vec![Step::pitch(pitch, octave(3), Duration::Eighth); SECTION_STEPS];
        let source = PatternSource::Sections(PatternSections {
            intro: section(PitchClass::C),
            development: section(PitchClass::E),
            cadence: section(PitchClass::G),
        });

        let steps = source.steps();
        assert_eq!(steps.len(), 48);
        assert_eq!(source.len(), 48);
        assert_eq!(steps[0].note, StepNote::Pitch { pitch: PitchClass::C, octave: octave(3) });
        assert_eq!(steps[16].note, StepNote::Pitch { pitch: PitchClass::E, octave: octave(3) });
        assert_eq!(steps[47].note, StepNote::Pitch { pitch: PitchClass::G, octave: octave(3) });
    }

    #[test]
    fn test_step_serializes_rest_with_octave_zero() {
        let json = serde_json::to_value(Step::rest(Duration::Sixteenth)).unwrap();
        assert_eq!(json, serde_json::json!({"note": "REST", "octave": 0, "duration": 16}));

        let json = serde_json::to_value(Step::pitch(PitchClass::ASharp, octave(5), Duration::Quarter))
            .unwrap();
        assert_eq!(json, serde_json::json!({"note": "A#", "octave": 5, "duration": 4}));
    }
}
