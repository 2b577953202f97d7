//! sidsong CLI - compile song documents to SID music
//!
//! Reads a JSON song document and writes a standalone 6502 assembly program,
//! a PSID library source, and (with ACME installed) a packaged `.sid` file.

use clap::Parser;
use sidsong_backend_sid::AssemblerConfig;
use std::path::PathBuf;
use std::process::ExitCode;

use sidsong_cli::commands;

/// sidsong - song document to SID chip compiler
#[derive(Parser)]
#[command(name = "sidsong")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the song document (JSON)
    input: PathBuf,

    /// Path of the standalone assembly output; `<base>_sid.asm`,
    /// `<base>_sid.prg` and `<base>.sid` are written next to it
    #[arg(required_unless_present = "check")]
    output: Option<PathBuf>,

    /// Path to the ACME assembler (default: $SIDSONG_ASSEMBLER, then PATH)
    #[arg(long)]
    assembler: Option<PathBuf>,

    /// Assembler timeout in seconds
    #[arg(long, default_value_t = sidsong_backend_sid::toolchain::DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Only validate the song document, write nothing
    #[arg(long)]
    check: bool,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn assembler_config(&self) -> AssemblerConfig {
        let mut config = AssemblerConfig::default().timeout_secs(self.timeout_secs);
        if let Some(path) = &self.assembler {
            config = config.assembler_path(path);
        }
        config
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match (&cli.output, cli.check) {
        (_, true) => commands::check::run(&cli.input),
        (Some(output), false) => commands::compile::run(&cli.input, output, &cli.assembler_config()),
        (None, false) => Err(anyhow::anyhow!("missing output path")),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use std::time::Duration;

    #[test]
    fn test_cli_parses_input_and_output() {
        let cli = Cli::try_parse_from(["sidsong", "song.json", "out/song.asm"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("song.json"));
        assert_eq!(cli.output, Some(PathBuf::from("out/song.asm")));
        assert!(!cli.check);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.timeout_secs, 60);
    }

    #[test]
    fn test_cli_requires_output_unless_checking() {
        assert!(Cli::try_parse_from(["sidsong", "song.json"]).is_err());

        let cli = Cli::try_parse_from(["sidsong", "song.json", "--check"]).unwrap();
        assert!(cli.check);
        assert_eq!(cli.output, None);
    }

    #[test]
    fn test_cli_assembler_options() {
        let cli = Cli::try_parse_from([
            "sidsong",
            "song.json",
            "song.asm",
            "--assembler",
            "/opt/acme/bin/acme",
            "--timeout-secs",
            "5",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);

        let config = cli.assembler_config();
        assert_eq!(
            config.assembler_path.as_deref(),
            Some(Path::new("/opt/acme/bin/acme"))
        );
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
