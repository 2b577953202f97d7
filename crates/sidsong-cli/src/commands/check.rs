//! Check command implementation
//!
//! Validates a song document without writing anything.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use super::reporting::print_validation_error;
use crate::input::{load_song, LoadResult};

/// Run the check command
///
/// # Returns
/// Exit code: 0 if valid, 1 if invalid
pub fn run(input: &Path) -> Result<ExitCode> {
    let start = Instant::now();
    println!("{} {}", "Checking:".cyan().bold(), input.display());

    match load_song(input)? {
        LoadResult::Valid(song) => {
            println!(
                "{} {} BPM, key {}, {}",
                "Song:".dimmed(),
                song.tempo.bpm(),
                song.key.as_str(),
                song.scale.as_str()
            );
            for voice in &song.voices {
                println!(
                    "  {} {} {} ({} steps)",
                    "-".dimmed(),
                    voice.role.as_str(),
                    voice.waveform.as_str(),
                    voice.steps().len()
                );
            }
            println!(
                "\n{} Song is valid ({}ms)",
                "SUCCESS".green().bold(),
                start.elapsed().as_millis()
            );
            Ok(ExitCode::SUCCESS)
        }
        LoadResult::Invalid(e) => {
            print_validation_error(&e);
            println!("\n{} Song is invalid", "FAILED".red().bold());
            Ok(ExitCode::from(1))
        }
    }
}
