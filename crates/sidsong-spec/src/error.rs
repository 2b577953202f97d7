//! Error types for song validation and processing.

use thiserror::Error;

/// Error codes for song document validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Document shape errors (E001-E003)
    /// E001: A required field is missing
    MissingField,
    /// E002: A field has the wrong JSON type
    WrongType,
    /// E003: The document root is not an object
    NotAnObject,

    // Song-level errors (E010-E015)
    /// E010: Tempo is not one of the supported BPM values
    UnsupportedTempo,
    /// E011: Key is not a pitch class
    InvalidKey,
    /// E012: Scale is not a named scale
    InvalidScale,
    /// E013: Song does not have exactly three voices
    VoiceCount,
    /// E014: A required role is not covered by any voice
    MissingRole,

    // Voice-level errors (E020-E027)
    /// E020: Unknown voice role
    InvalidRole,
    /// E021: Unknown waveform
    InvalidWaveform,
    /// E022: Envelope nibble out of range
    EnvelopeOutOfRange,
    /// E023: Pulse width missing, out of range, or given for a non-pulse voice
    InvalidPulseWidth,
    /// E024: Unknown filter type
    InvalidFilterType,
    /// E025: Filter cutoff or resonance out of range
    FilterOutOfRange,
    /// E026: Pattern given in neither or both accepted shapes
    PatternShape,
    /// E027: Pattern or section has the wrong number of steps
    PatternLength,

    // Step-level errors (E030-E032)
    /// E030: Unknown note name
    InvalidNote,
    /// E031: Octave not valid for the step's note
    InvalidOctave,
    /// E032: Unknown step duration
    InvalidDuration,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::MissingField => "E001",
            ErrorCode::WrongType => "E002",
            ErrorCode::NotAnObject => "E003",
            ErrorCode::UnsupportedTempo => "E010",
            ErrorCode::InvalidKey => "E011",
            ErrorCode::InvalidScale => "E012",
            ErrorCode::VoiceCount => "E013",
            ErrorCode::MissingRole => "E014",
            ErrorCode::InvalidRole => "E020",
            ErrorCode::InvalidWaveform => "E021",
            ErrorCode::EnvelopeOutOfRange => "E022",
            ErrorCode::InvalidPulseWidth => "E023",
            ErrorCode::InvalidFilterType => "E024",
            ErrorCode::FilterOutOfRange => "E025",
            ErrorCode::PatternShape => "E026",
            ErrorCode::PatternLength => "E027",
            ErrorCode::InvalidNote => "E030",
            ErrorCode::InvalidOctave => "E031",
            ErrorCode::InvalidDuration => "E032",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A validation error with code, message, and optional JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error code.
    pub code: ErrorCode,
    /// Human-readable error message naming the field and its actual value.
    pub message: String,
    /// JSON path to the problematic field (e.g., "voices\[0\].pattern\[3\].octave").
    pub path: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Creates a new validation error with a JSON path.
    pub fn with_path(code: ErrorCode, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Top-level error type for song document operations.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The document failed validation.
    #[error("song validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Common trait for backend errors.
///
/// Each backend error type implements this trait so callers can report
/// stable codes without depending on the backend's concrete error enum.
///
/// # Example
///
/// ```ignore
/// use sidsong_spec::error::BackendError;
///
/// fn handle_error<E: BackendError>(err: E) {
///     eprintln!("[{}] {}", err.code(), err.message());
/// }
/// ```
pub trait BackendError: std::error::Error {
    /// Stable error code, e.g. "SID_001".
    fn code(&self) -> &'static str;

    /// Human-readable message; defaults to the `Display` output.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Error category for grouping related errors.
    fn category(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::MissingField.to_string(), "E001");
        assert_eq!(ErrorCode::InvalidDuration.code(), "E032");
    }

    #[test]
    fn test_validation_error_display_with_path() {
        let err = ValidationError::with_path(
            ErrorCode::InvalidOctave,
            "octave must be 2, 3, 4 or 5 for a pitched note, got 7",
            "voices[0].pattern[3].octave",
        );
        assert_eq!(
            err.to_string(),
            "E031: octave must be 2, 3, 4 or 5 for a pitched note, got 7 (at voices[0].pattern[3].octave)"
        );
    }

    #[test]
    fn test_spec_error_wraps_validation() {
        let err: SpecError = ValidationError::new(ErrorCode::VoiceCount, "expected 3 voices").into();
        assert!(err.to_string().contains("expected 3 voices"));
    }
}
