//! Enumeration catalog: the closed sets of legal values a song document may use.
//!
//! Every set is a Rust enum (or a range-checked newtype), so once a document
//! has passed validation an out-of-set value cannot be represented.

use serde::Serialize;

/// Supported tempi in beats per minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u16")]
pub enum Tempo {
    Bpm60,
    Bpm80,
    Bpm90,
    Bpm100,
    Bpm120,
    Bpm140,
    Bpm160,
}

impl Tempo {
    /// All supported tempi, slowest first.
    pub const ALL: [Tempo; 7] = [
        Tempo::Bpm60,
        Tempo::Bpm80,
        Tempo::Bpm90,
        Tempo::Bpm100,
        Tempo::Bpm120,
        Tempo::Bpm140,
        Tempo::Bpm160,
    ];

    /// Returns the tempo in beats per minute.
    pub fn bpm(&self) -> u16 {
        match self {
            Tempo::Bpm60 => 60,
            Tempo::Bpm80 => 80,
            Tempo::Bpm90 => 90,
            Tempo::Bpm100 => 100,
            Tempo::Bpm120 => 120,
            Tempo::Bpm140 => 140,
            Tempo::Bpm160 => 160,
        }
    }

    /// Looks up a tempo by its BPM value.
    pub fn from_bpm(bpm: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.bpm() == bpm)
    }
}

impl From<Tempo> for u16 {
    fn from(value: Tempo) -> Self {
        value.bpm()
    }
}

/// The twelve pitch classes, sharps only, in ascending order from C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PitchClass {
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C#")]
    CSharp,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "D#")]
    DSharp,
    #[serde(rename = "E")]
    E,
    #[serde(rename = "F")]
    F,
    #[serde(rename = "F#")]
    FSharp,
    #[serde(rename = "G")]
    G,
    #[serde(rename = "G#")]
    GSharp,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A#")]
    ASharp,
    #[serde(rename = "B")]
    B,
}

impl PitchClass {
    /// All pitch classes in index order.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Semitone index above C (0-11).
    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Returns the document spelling (e.g. "C#").
    pub fn as_str(&self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    /// Parses the document spelling.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == s)
    }
}

/// Named scales. Carried as metadata only; pitch choice is not checked against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    Major,
    Minor,
    Dorian,
    Phrygian,
    Mixolydian,
    Pentatonic,
}

impl Scale {
    pub const ALL: [Scale; 6] = [
        Scale::Major,
        Scale::Minor,
        Scale::Dorian,
        Scale::Phrygian,
        Scale::Mixolydian,
        Scale::Pentatonic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scale::Major => "major",
            Scale::Minor => "minor",
            Scale::Dorian => "dorian",
            Scale::Phrygian => "phrygian",
            Scale::Mixolydian => "mixolydian",
            Scale::Pentatonic => "pentatonic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }
}

/// Musical role of a voice. All three roles must appear in a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Lead,
    Bass,
    ArpOrDrums,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Lead, Role::Bass, Role::ArpOrDrums];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Lead => "LEAD",
            Role::Bass => "BASS",
            Role::ArpOrDrums => "ARP_OR_DRUMS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }
}

/// Oscillator waveform of a voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Waveform {
    Tri,
    Saw,
    Pulse,
    Noise,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Tri,
        Waveform::Saw,
        Waveform::Pulse,
        Waveform::Noise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Waveform::Tri => "TRI",
            Waveform::Saw => "SAW",
            Waveform::Pulse => "PULSE",
            Waveform::Noise => "NOISE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }
}

/// Filter mode requested by a voice. Combined modes request more than one
/// filter output at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FilterType {
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "LP")]
    Lp,
    #[serde(rename = "BP")]
    Bp,
    #[serde(rename = "HP")]
    Hp,
    #[serde(rename = "LP+BP")]
    LpBp,
    #[serde(rename = "HP+BP")]
    HpBp,
}

impl FilterType {
    pub const ALL: [FilterType; 6] = [
        FilterType::None,
        FilterType::Lp,
        FilterType::Bp,
        FilterType::Hp,
        FilterType::LpBp,
        FilterType::HpBp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::None => "NONE",
            FilterType::Lp => "LP",
            FilterType::Bp => "BP",
            FilterType::Hp => "HP",
            FilterType::LpBp => "LP+BP",
            FilterType::HpBp => "HP+BP",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }

    /// Returns true if this type asks for any filtering at all.
    pub fn is_active(&self) -> bool {
        !matches!(self, FilterType::None)
    }

    pub fn has_low_pass(&self) -> bool {
        matches!(self, FilterType::Lp | FilterType::LpBp)
    }

    pub fn has_band_pass(&self) -> bool {
        matches!(self, FilterType::Bp | FilterType::LpBp | FilterType::HpBp)
    }

    pub fn has_high_pass(&self) -> bool {
        matches!(self, FilterType::Hp | FilterType::HpBp)
    }
}

/// Step length as a note value: 4 = quarter, 8 = eighth, 16 = sixteenth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum Duration {
    Quarter,
    Eighth,
    Sixteenth,
}

impl Duration {
    pub const ALL: [Duration; 3] = [Duration::Quarter, Duration::Eighth, Duration::Sixteenth];

    /// The note-value denominator used in documents.
    pub fn denominator(&self) -> u8 {
        match self {
            Duration::Quarter => 4,
            Duration::Eighth => 8,
            Duration::Sixteenth => 16,
        }
    }

    /// Length of the step in beats.
    pub fn beats(&self) -> f64 {
        match self {
            Duration::Quarter => 1.0,
            Duration::Eighth => 0.5,
            Duration::Sixteenth => 0.25,
        }
    }

    pub fn from_denominator(value: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.denominator() == value)
    }
}

impl From<Duration> for u8 {
    fn from(value: Duration) -> Self {
        value.denominator()
    }
}

/// Octave of a pitched step (2-5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub struct Octave(u8);

impl Octave {
    pub const MIN: u8 = 2;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl From<Octave> for u8 {
    fn from(value: Octave) -> Self {
        value.0
    }
}

/// A 4-bit value (0-15), used for envelope stages and filter resonance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub struct Nibble(u8);

impl Nibble {
    pub const MAX: u8 = 15;

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl From<Nibble> for u8 {
    fn from(value: Nibble) -> Self {
        value.0
    }
}

/// Largest 12-bit pulse width.
pub const MAX_PULSE_WIDTH: u16 = 4095;

/// Largest 11-bit filter cutoff.
pub const MAX_CUTOFF: u16 = 2047;
