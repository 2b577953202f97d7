//! Pattern compilation: a voice's steps become parallel note/octave/tick tables.

use sidsong_spec::{FilterRequest, Octave, PitchClass, Role, Step, StepNote, Voice};

use crate::note::ticks_for;
use crate::registers::VoiceRegisters;

/// Hard cap on compiled table length. Longer input is truncated, shorter
/// input is never padded.
pub const MAX_COMPILED_STEPS: usize = 192;

/// Note-table byte marking a rest. Outside the 0-11 pitch range so the player
/// tests for it with one compare.
pub const REST_SENTINEL: u8 = 0xFF;

/// Note-table entry: silence, or a pitch class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteCode {
    Rest,
    Pitch(PitchClass),
}

impl NoteCode {
    /// Lower to the byte stored in the note table.
    pub fn to_byte(self) -> u8 {
        match self {
            NoteCode::Rest => REST_SENTINEL,
            NoteCode::Pitch(pitch) => pitch.index(),
        }
    }
}

/// Everything the code generator needs to know about one voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledVoice {
    pub role: Role,
    pub notes: Vec<NoteCode>,
    /// Octave per step, clamped to 2-5 (rests use 2).
    pub octaves: Vec<u8>,
    /// Scheduler ticks per step, each at least 1.
    pub ticks: Vec<u8>,
    /// Index of the first non-rest step, or 0 for an all-rest pattern.
    pub init_step: usize,
    pub registers: VoiceRegisters,
    pub filter: FilterRequest,
}

impl CompiledVoice {
    /// Compile a validated voice at the given tempo.
    pub fn compile(voice: &Voice, bpm: u16) -> Self {
        let steps = voice.steps();
        let (notes, octaves, ticks) = compile_steps(&steps, bpm);
        let init_step = first_audible_step(&notes);

        log::debug!(
            "compiled {} voice: {} steps, first audible step {}",
            voice.role.as_str(),
            notes.len(),
            init_step
        );

        Self {
            role: voice.role,
            notes,
            octaves,
            ticks,
            init_step,
            registers: VoiceRegisters::encode(voice),
            filter: voice.filter,
        }
    }

    /// Compiled pattern length.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Note table lowered to bytes, rests as [`REST_SENTINEL`].
    pub fn note_bytes(&self) -> Vec<u8> {
        self.notes.iter().map(|n| n.to_byte()).collect()
    }

    /// True if at least one step sounds.
    pub fn has_audible_step(&self) -> bool {
        self.notes.iter().any(|n| *n != NoteCode::Rest)
    }
}

/// Map steps to the three parallel tables.
pub fn compile_steps(steps: &[Step], bpm: u16) -> (Vec<NoteCode>, Vec<u8>, Vec<u8>) {
    let steps = &steps[..steps.len().min(MAX_COMPILED_STEPS)];

    let mut notes = Vec::with_capacity(steps.len());
    let mut octaves = Vec::with_capacity(steps.len());
    let mut ticks = Vec::with_capacity(steps.len());

    for step in steps {
        let (note, octave) = match step.note {
            StepNote::Rest => (NoteCode::Rest, Octave::MIN),
            StepNote::Pitch { pitch, octave } => (NoteCode::Pitch(pitch), octave.get()),
        };
        notes.push(note);
        octaves.push(octave.clamp(Octave::MIN, Octave::MAX));
        ticks.push(u8::try_from(ticks_for(bpm, step.duration)).unwrap_or(u8::MAX));
    }

    (notes, octaves, ticks)
}

/// Index of the first non-rest entry, 0 when every entry is a rest.
pub fn first_audible_step(notes: &[NoteCode]) -> usize {
    notes
        .iter()
        .position(|n| *n != NoteCode::Rest)
        .unwrap_or(0)
}
