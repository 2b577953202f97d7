//! Song document loading.

use anyhow::{Context, Result};
use sidsong_spec::{validate_song, Song, ValidationError};
use std::path::Path;

/// Outcome of loading a readable, well-formed JSON document.
#[derive(Debug)]
pub enum LoadResult {
    Valid(Song),
    Invalid(ValidationError),
}

/// Read and validate a song document.
///
/// I/O and JSON syntax problems are errors; a document that parses but breaks
/// a song rule is returned as [`LoadResult::Invalid`] so it can be reported
/// field by field.
pub fn load_song(path: &Path) -> Result<LoadResult> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read song file: {}", path.display()))?;
    let doc: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse song file as JSON: {}", path.display()))?;

    Ok(match validate_song(&doc) {
        Ok(song) => {
            log::debug!("{} is a valid song", path.display());
            LoadResult::Valid(song)
        }
        Err(e) => {
            log::debug!("{} failed validation: {}", path.display(), e);
            LoadResult::Invalid(e)
        }
    })
}
