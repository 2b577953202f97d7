//! Error types for the SID backend.

use sidsong_spec::BackendError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for SID backend operations.
pub type SidResult<T> = Result<T, SidError>;

/// Errors that can occur while building SID artifacts.
#[derive(Debug, Error)]
pub enum SidError {
    /// Assembler executable not found.
    #[error("assembler not found. Install ACME and put it in PATH, or set SIDSONG_ASSEMBLER")]
    AssemblerNotFound,

    /// Failed to spawn the assembler process.
    #[error("failed to spawn assembler: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// Assembler timed out.
    #[error("assembler timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Assembler exited with non-zero status.
    #[error("assembler exited with status {exit_code}: {stderr}")]
    AssemblerFailed { exit_code: i32, stderr: String },

    /// Assembler reported success but produced no image.
    #[error("expected assembler output not found: {path}")]
    OutputNotFound { path: PathBuf },

    /// Failed to write an artifact.
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output path collides with a derived artifact.
    #[error("output {path} would be overwritten by the packaged .sid; use a different extension")]
    OutputConflict { path: PathBuf },

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SidError {
    pub fn assembler_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::AssemblerFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }

    pub fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFailed {
            path: path.into(),
            source,
        }
    }

    /// True when the host simply has no assembler; the caller may still use
    /// the assembly text.
    pub fn is_toolchain_unavailable(&self) -> bool {
        matches!(self, SidError::AssemblerNotFound)
    }
}

impl BackendError for SidError {
    fn code(&self) -> &'static str {
        match self {
            SidError::AssemblerNotFound => "SID_001",
            SidError::SpawnFailed(_) => "SID_002",
            SidError::Timeout { .. } => "SID_003",
            SidError::AssemblerFailed { .. } => "SID_004",
            SidError::OutputNotFound { .. } => "SID_005",
            SidError::WriteFailed { .. } => "SID_006",
            SidError::Io(_) => "SID_007",
            SidError::OutputConflict { .. } => "SID_008",
        }
    }

    fn category(&self) -> &'static str {
        "sid"
    }
}
