//! Song document validation.
//!
//! Walks an untyped JSON document and builds a [`Song`], failing on the first
//! missing field or out-of-catalog value. Nothing is defaulted or coerced,
//! except that absent free-text metadata reads as an empty string.

use serde_json::{Map, Value};

use crate::catalog::{
    Duration, FilterType, Nibble, Octave, PitchClass, Role, Scale, Tempo, Waveform, MAX_CUTOFF,
    MAX_PULSE_WIDTH,
};
use crate::error::{ErrorCode, ValidationError};
use crate::song::{
    Adsr, FilterRequest, PatternSections, PatternSource, Song, Step, StepNote, Voice,
    MAX_PATTERN_STEPS, MIN_PATTERN_STEPS, SECTION_STEPS, VOICE_COUNT,
};

type Result<T> = std::result::Result<T, ValidationError>;

/// Note spelling for a silent step.
pub const REST: &str = "REST";

/// Validates a JSON song document.
///
/// # Returns
/// * `Ok(Song)` if every rule holds
/// * `Err(ValidationError)` for the first violated rule, naming the field and its value
///
/// # Example
/// ```
/// use sidsong_spec::validation::validate_song;
///
/// let err = validate_song(&serde_json::json!({"bpm": 121})).unwrap_err();
/// assert!(err.message.contains("121"));
/// ```
pub fn validate_song(doc: &Value) -> Result<Song> {
    let root = as_object(doc, "$")?;

    let tempo = {
        let value = field(root, "bpm", "bpm")?;
        let bpm = as_int(value, "bpm")?;
        u16::try_from(bpm)
            .ok()
            .and_then(Tempo::from_bpm)
            .ok_or_else(|| {
                ValidationError::with_path(
                    ErrorCode::UnsupportedTempo,
                    format!("bpm must be one of {}, got {}", tempo_list(), value),
                    "bpm",
                )
            })?
    };

    let key = {
        let value = field(root, "key", "key")?;
        let name = as_str(value, "key")?;
        PitchClass::parse(name).ok_or_else(|| {
            ValidationError::with_path(
                ErrorCode::InvalidKey,
                format!("key must be a pitch class (C, C#, D, ... B), got {}", value),
                "key",
            )
        })?
    };

    let scale = {
        let value = field(root, "scale", "scale")?;
        let name = as_str(value, "scale")?;
        Scale::parse(name).ok_or_else(|| {
            ValidationError::with_path(
                ErrorCode::InvalidScale,
                format!(
                    "scale must be one of {}, got {}",
                    join(Scale::ALL.iter().map(|s| s.as_str())),
                    value
                ),
                "scale",
            )
        })?
    };

    let voices_value = field(root, "voices", "voices")?;
    let voice_docs = voices_value.as_array().ok_or_else(|| {
        wrong_type("voices", "an array of voices", voices_value)
    })?;
    if voice_docs.len() != VOICE_COUNT {
        return Err(ValidationError::with_path(
            ErrorCode::VoiceCount,
            format!("expected exactly {} voices, got {}", VOICE_COUNT, voice_docs.len()),
            "voices",
        ));
    }

    let mut roles = Vec::with_capacity(VOICE_COUNT);
    for (i, voice) in voice_docs.iter().enumerate() {
        let path = format!("voices[{}]", i);
        let obj = as_object(voice, &path)?;
        roles.push(parse_role(obj, &path)?);
    }
    for required in Role::ALL {
        if !roles.contains(&required) {
            return Err(ValidationError::with_path(
                ErrorCode::MissingRole,
                format!(
                    "voices must cover roles {}, but no voice has role {}",
                    join(Role::ALL.iter().map(|r| r.as_str())),
                    required.as_str()
                ),
                "voices",
            ));
        }
    }

    let voices = [
        validate_voice(&voice_docs[0], roles[0], "voices[0]")?,
        validate_voice(&voice_docs[1], roles[1], "voices[1]")?,
        validate_voice(&voice_docs[2], roles[2], "voices[2]")?,
    ];

    Ok(Song {
        tempo,
        key,
        scale,
        voices,
        title: metadata(root, "title")?,
        author: metadata(root, "author")?,
        released: metadata(root, "released")?,
    })
}

fn validate_voice(doc: &Value, role: Role, path: &str) -> Result<Voice> {
    let obj = as_object(doc, path)?;

    let waveform = {
        let p = format!("{}.waveform", path);
        let value = field(obj, "waveform", &p)?;
        let name = as_str(value, &p)?;
        Waveform::parse(name).ok_or_else(|| {
            ValidationError::with_path(
                ErrorCode::InvalidWaveform,
                format!(
                    "waveform must be one of {}, got {}",
                    join(Waveform::ALL.iter().map(|w| w.as_str())),
                    value
                ),
                p.clone(),
            )
        })?
    };

    let adsr = {
        let p = format!("{}.adsr", path);
        let adsr = as_object(field(obj, "adsr", &p)?, &p)?;
        Adsr {
            attack: envelope_nibble(adsr, "attack", &p)?,
            decay: envelope_nibble(adsr, "decay", &p)?,
            sustain: envelope_nibble(adsr, "sustain", &p)?,
            release: envelope_nibble(adsr, "release", &p)?,
        }
    };

    let pulse_width = validate_pulse_width(obj, waveform, path)?;
    let filter = validate_filter(obj, path)?;
    let pattern = validate_pattern(obj, path)?;

    Ok(Voice {
        role,
        waveform,
        adsr,
        pulse_width,
        filter,
        pattern,
    })
}

fn parse_role(obj: &Map<String, Value>, path: &str) -> Result<Role> {
    let p = format!("{}.role", path);
    let value = field(obj, "role", &p)?;
    let name = as_str(value, &p)?;
    Role::parse(name).ok_or_else(|| {
        ValidationError::with_path(
            ErrorCode::InvalidRole,
            format!(
                "role must be one of {}, got {}",
                join(Role::ALL.iter().map(|r| r.as_str())),
                value
            ),
            p.clone(),
        )
    })
}

fn envelope_nibble(obj: &Map<String, Value>, name: &str, path: &str) -> Result<Nibble> {
    let p = format!("{}.{}", path, name);
    let value = field(obj, name, &p)?;
    nibble(value, &p, ErrorCode::EnvelopeOutOfRange)
}

fn nibble(value: &Value, path: &str, code: ErrorCode) -> Result<Nibble> {
    let n = as_int(value, path)?;
    u8::try_from(n).ok().and_then(Nibble::new).ok_or_else(|| {
        ValidationError::with_path(
            code,
            format!("{} must be an integer 0-15, got {}", path, value),
            path,
        )
    })
}

fn validate_pulse_width(
    obj: &Map<String, Value>,
    waveform: Waveform,
    path: &str,
) -> Result<Option<u16>> {
    let p = format!("{}.pulseWidth", path);
    match (waveform, obj.get("pulseWidth")) {
        (Waveform::Pulse, None) => Err(ValidationError::with_path(
            ErrorCode::InvalidPulseWidth,
            "pulseWidth is required when waveform is PULSE",
            p,
        )),
        (Waveform::Pulse, Some(value)) => {
            let n = as_int(value, &p)?;
            let width = u16::try_from(n)
                .ok()
                .filter(|w| *w <= MAX_PULSE_WIDTH)
                .ok_or_else(|| {
                    ValidationError::with_path(
                        ErrorCode::InvalidPulseWidth,
                        format!("pulseWidth must be an integer 0-{}, got {}", MAX_PULSE_WIDTH, value),
                        p.clone(),
                    )
                })?;
            Ok(Some(width))
        }
        (other, Some(value)) => Err(ValidationError::with_path(
            ErrorCode::InvalidPulseWidth,
            format!(
                "pulseWidth is only allowed when waveform is PULSE, got {} with waveform {}",
                value,
                other.as_str()
            ),
            p,
        )),
        (_, None) => Ok(None),
    }
}

fn validate_filter(obj: &Map<String, Value>, path: &str) -> Result<FilterRequest> {
    let p = format!("{}.filter", path);
    let filter = as_object(field(obj, "filter", &p)?, &p)?;

    let type_path = format!("{}.type", p);
    let type_value = field(filter, "type", &type_path)?;
    let type_name = as_str(type_value, &type_path)?;
    let kind = FilterType::parse(type_name).ok_or_else(|| {
        ValidationError::with_path(
            ErrorCode::InvalidFilterType,
            format!(
                "filter type must be one of {}, got {}",
                join(FilterType::ALL.iter().map(|f| f.as_str())),
                type_value
            ),
            type_path.clone(),
        )
    })?;

    let cutoff_path = format!("{}.cutoff", p);
    let cutoff_value = field(filter, "cutoff", &cutoff_path)?;
    let cutoff = u16::try_from(as_int(cutoff_value, &cutoff_path)?)
        .ok()
        .filter(|c| *c <= MAX_CUTOFF)
        .ok_or_else(|| {
            ValidationError::with_path(
                ErrorCode::FilterOutOfRange,
                format!("filter cutoff must be an integer 0-{}, got {}", MAX_CUTOFF, cutoff_value),
                cutoff_path.clone(),
            )
        })?;

    let resonance_path = format!("{}.resonance", p);
    let resonance = nibble(
        field(filter, "resonance", &resonance_path)?,
        &resonance_path,
        ErrorCode::FilterOutOfRange,
    )?;

    Ok(FilterRequest {
        kind,
        cutoff,
        resonance,
    })
}

fn validate_pattern(obj: &Map<String, Value>, path: &str) -> Result<PatternSource> {
    match (obj.get("pattern"), obj.get("patternSections")) {
        (Some(flat), None) => {
            let p = format!("{}.pattern", path);
            let steps = validate_steps(flat, &p)?;
            if !(MIN_PATTERN_STEPS..=MAX_PATTERN_STEPS).contains(&steps.len()) {
                return Err(ValidationError::with_path(
                    ErrorCode::PatternLength,
                    format!(
                        "pattern must have {}-{} steps, got {}",
                        MIN_PATTERN_STEPS,
                        MAX_PATTERN_STEPS,
                        steps.len()
                    ),
                    p,
                ));
            }
            Ok(PatternSource::Flat(steps))
        }
        (None, Some(sections)) => {
            let p = format!("{}.patternSections", path);
            let sections = as_object(sections, &p)?;
            Ok(PatternSource::Sections(PatternSections {
                intro: validate_section(sections, "intro", &p)?,
                development: validate_section(sections, "development", &p)?,
                cadence: validate_section(sections, "cadence", &p)?,
            }))
        }
        (Some(_), Some(_)) => Err(ValidationError::with_path(
            ErrorCode::PatternShape,
            "voice must give either pattern or patternSections, not both",
            path,
        )),
        (None, None) => Err(ValidationError::with_path(
            ErrorCode::PatternShape,
            "voice must give a pattern or patternSections",
            path,
        )),
    }
}

fn validate_section(obj: &Map<String, Value>, name: &str, path: &str) -> Result<Vec<Step>> {
    let p = format!("{}.{}", path, name);
    let steps = validate_steps(field(obj, name, &p)?, &p)?;
    if steps.len() != SECTION_STEPS {
        return Err(ValidationError::with_path(
            ErrorCode::PatternLength,
            format!("section {} must have exactly {} steps, got {}", name, SECTION_STEPS, steps.len()),
            p,
        ));
    }
    Ok(steps)
}

fn validate_steps(value: &Value, path: &str) -> Result<Vec<Step>> {
    let items = value
        .as_array()
        .ok_or_else(|| wrong_type(path, "an array of steps", value))?;
    items
        .iter()
        .enumerate()
        .map(|(i, step)| validate_step(step, &format!("{}[{}]", path, i)))
        .collect()
}

fn validate_step(value: &Value, path: &str) -> Result<Step> {
    let obj = as_object(value, path)?;

    let note_path = format!("{}.note", path);
    let note_value = field(obj, "note", &note_path)?;
    let note_name = as_str(note_value, &note_path)?;
    let pitch = if note_name == REST {
        None
    } else {
        Some(PitchClass::parse(note_name).ok_or_else(|| {
            ValidationError::with_path(
                ErrorCode::InvalidNote,
                format!("note must be REST or a pitch class, got {}", note_value),
                note_path.clone(),
            )
        })?)
    };

    let octave_path = format!("{}.octave", path);
    let octave_value = field(obj, "octave", &octave_path)?;
    let octave = as_int(octave_value, &octave_path)?;
    let note = match pitch {
        None if octave == 0 => StepNote::Rest,
        None => {
            return Err(ValidationError::with_path(
                ErrorCode::InvalidOctave,
                format!("octave must be 0 for a REST step, got {}", octave_value),
                octave_path,
            ))
        }
        Some(pitch) => {
            let octave = u8::try_from(octave).ok().and_then(Octave::new).ok_or_else(|| {
                ValidationError::with_path(
                    ErrorCode::InvalidOctave,
                    format!("octave must be 2, 3, 4 or 5 for a pitched note, got {}", octave_value),
                    octave_path.clone(),
                )
            })?;
            StepNote::Pitch { pitch, octave }
        }
    };

    let duration_path = format!("{}.duration", path);
    let duration_value = field(obj, "duration", &duration_path)?;
    let duration = u8::try_from(as_int(duration_value, &duration_path)?)
        .ok()
        .and_then(Duration::from_denominator)
        .ok_or_else(|| {
            ValidationError::with_path(
                ErrorCode::InvalidDuration,
                format!("duration must be 4, 8 or 16, got {}", duration_value),
                duration_path.clone(),
            )
        })?;

    Ok(Step { note, duration })
}

fn metadata(root: &Map<String, Value>, name: &str) -> Result<String> {
    match root.get(name) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(wrong_type(name, "a string", other)),
    }
}

fn field<'a>(obj: &'a Map<String, Value>, name: &str, path: &str) -> Result<&'a Value> {
    obj.get(name).ok_or_else(|| {
        ValidationError::with_path(
            ErrorCode::MissingField,
            format!("missing required field '{}'", name),
            path,
        )
    })
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        let code = if path == "$" {
            ErrorCode::NotAnObject
        } else {
            ErrorCode::WrongType
        };
        ValidationError::with_path(code, format!("expected an object, got {}", value), path)
    })
}

fn as_str<'a>(value: &'a Value, path: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| wrong_type(path, "a string", value))
}

fn as_int(value: &Value, path: &str) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| wrong_type(path, "an integer", value))
}

fn wrong_type(path: &str, expected: &str, value: &Value) -> ValidationError {
    ValidationError::with_path(
        ErrorCode::WrongType,
        format!("{} must be {}, got {}", path, expected, value),
        path,
    )
}

fn tempo_list() -> String {
    join(Tempo::ALL.iter().map(|t| t.bpm().to_string()))
}

fn join<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
