//! Compile command implementation
//!
//! Validates a song document, writes the standalone and library assembly
//! sources, and packages a PSID binary when an assembler is available.

use anyhow::{Context, Result};
use colored::Colorize;
use sidsong_backend_sid::{generate, AssemblerConfig, SidError};
use sidsong_spec::BackendError;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use super::reporting::print_validation_error;
use crate::input::{load_song, LoadResult};

/// Run the compile command
///
/// # Arguments
/// * `input` - Path to the song document (JSON)
/// * `output` - Path of the standalone assembly source; the other artifacts
///   are named after it
/// * `config` - Assembler lookup and timeout
///
/// # Returns
/// Exit code: 0 on success (including a skipped packaging step), 1 on an
/// invalid song or assembler failure
pub fn run(input: &Path, output: &Path, config: &AssemblerConfig) -> Result<ExitCode> {
    let start = Instant::now();
    println!("{} {}", "Compiling:".cyan().bold(), input.display());

    let song = match load_song(input)? {
        LoadResult::Valid(song) => song,
        LoadResult::Invalid(e) => {
            print_validation_error(&e);
            println!("\n{} Song is invalid, nothing written", "FAILED".red().bold());
            return Ok(ExitCode::from(1));
        }
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
    }

    let result = match generate(&song, output, config) {
        Ok(result) => result,
        Err(e @ SidError::AssemblerFailed { .. }) => {
            println!(
                "\n{} [{}] {}",
                "ASSEMBLY FAILED".red().bold(),
                e.code().red(),
                e
            );
            println!("{} {}", "Sources kept:".dimmed(), output.display());
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e).context("compilation failed"),
    };

    for path in result.written() {
        println!("  {} {}", "+".green(), path.display());
    }

    match &result.packaged {
        Some(sid) => {
            println!("{} {}", "BLAKE3:".dimmed(), sid.hash);
            println!(
                "\n{} Packaged {} bytes in {}ms",
                "SUCCESS".green().bold(),
                sid.size,
                start.elapsed().as_millis()
            );
        }
        None => {
            println!(
                "\n{} Assembler not found, wrote assembly sources only (set {} or install acme)",
                "WARNING".yellow().bold(),
                sidsong_backend_sid::ASSEMBLER_ENV
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}
