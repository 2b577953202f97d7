//! Console output shared by the commands.

use colored::Colorize;
use sidsong_spec::ValidationError;

/// Print a validation failure with its code and JSON path.
pub fn print_validation_error(error: &ValidationError) {
    let path_info = error
        .path
        .as_ref()
        .map(|p| format!(" at {}", p))
        .unwrap_or_default();
    println!("\n{}", "Errors:".red().bold());
    println!(
        "  {} [{}]{}: {}",
        "x".red(),
        error.code.to_string().red(),
        path_info.dimmed(),
        error.message
    );
}
