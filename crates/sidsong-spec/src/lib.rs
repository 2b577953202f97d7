//! sidsong Song Document Library
//!
//! This crate provides the types and validation for sidsong song documents:
//! JSON descriptions of a three-voice chip tune that the SID backend compiles
//! into 6502 assembly and a PSID binary.
//!
//! # Example
//!
//! ```
//! use sidsong_spec::{Song, Tempo};
//!
//! let rest = r#"{"note": "REST", "octave": 0, "duration": 4}"#;
//! let pattern = vec![rest; 64].join(",");
//! let voice = |role: &str, waveform: &str| {
//!     format!(
//!         r#"{{"role": "{}", "waveform": "{}",
//!             "adsr": {{"attack": 0, "decay": 9, "sustain": 0, "release": 0}},
//!             "filter": {{"type": "NONE", "cutoff": 0, "resonance": 0}},
//!             "pattern": [{}]}}"#,
//!         role, waveform, pattern
//!     )
//! };
//! let json = format!(
//!     r#"{{"bpm": 120, "key": "C", "scale": "major", "voices": [{}, {}, {}]}}"#,
//!     voice("LEAD", "TRI"),
//!     voice("BASS", "SAW"),
//!     voice("ARP_OR_DRUMS", "NOISE"),
//! );
//!
//! let song = Song::from_json(&json).unwrap();
//! assert_eq!(song.tempo, Tempo::Bpm120);
//! ```
//!
//! # Modules
//!
//! - [`catalog`]: Closed sets of legal values (tempo, key, scale, role, ...)
//! - [`song`]: Validated song document types
//! - [`validation`]: JSON document validation
//! - [`error`]: Error types

pub mod catalog;
pub mod error;
pub mod song;
pub mod validation;

pub use catalog::{
    Duration, FilterType, Nibble, Octave, PitchClass, Role, Scale, Tempo, Waveform, MAX_CUTOFF,
    MAX_PULSE_WIDTH,
};
pub use error::{BackendError, ErrorCode, SpecError, ValidationError};
pub use song::{
    Adsr, FilterRequest, PatternSections, PatternSource, Song, SongMetadata, Step, StepNote, Voice,
    MAX_PATTERN_STEPS, MIN_PATTERN_STEPS, SECTION_STEPS, VOICE_COUNT,
};
pub use validation::validate_song;
