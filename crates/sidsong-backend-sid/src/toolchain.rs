//! ACME assembler subprocess invocation.
//!
//! The assembler turns the library-layout source into a C64 program image.
//! It is looked up in this order:
//!
//! 1. `AssemblerConfig::assembler_path`
//! 2. `SIDSONG_ASSEMBLER` environment variable
//! 3. `acme` on `PATH`
//!
//! A configured path is final: when it does not exist the assembler is
//! reported as not found and the later steps are skipped.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{SidError, SidResult};

/// Environment variable naming the assembler executable.
pub const ASSEMBLER_ENV: &str = "SIDSONG_ASSEMBLER";

/// Default timeout for one assembler run.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the assembler.
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// Path to the assembler executable.
    pub assembler_path: Option<PathBuf>,
    /// Timeout for one run.
    pub timeout: Duration,
    /// Whether to capture the assembler's stderr for error reports.
    pub capture_output: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            assembler_path: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            capture_output: true,
        }
    }
}

impl AssemblerConfig {
    /// Sets the assembler executable path.
    pub fn assembler_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.assembler_path = Some(path.into());
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// Runs the external assembler.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    config: AssemblerConfig,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AssemblerConfig) -> Self {
        Self { config }
    }

    /// Finds the assembler executable.
    pub fn find(&self) -> SidResult<PathBuf> {
        if let Some(ref path) = self.config.assembler_path {
            if path.exists() {
                return Ok(path.clone());
            }
            log::warn!("configured assembler {} does not exist", path.display());
            return Err(SidError::AssemblerNotFound);
        }

        if let Ok(path) = std::env::var(ASSEMBLER_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(path);
            }
        }

        let names = if cfg!(windows) {
            vec!["acme.exe", "acme"]
        } else {
            vec!["acme"]
        };
        for name in names {
            if let Ok(path) = which::which(name) {
                return Ok(path);
            }
        }

        Err(SidError::AssemblerNotFound)
    }

    /// Assembles `source` into `output` and returns the image bytes.
    ///
    /// The source is assembled with `--format cbm`, so the image starts with
    /// its 2-byte load address.
    pub fn assemble(&self, source: &Path, output: &Path) -> SidResult<Vec<u8>> {
        let assembler = self.find()?;
        log::info!(
            "assembling {} with {}",
            source.display(),
            assembler.display()
        );

        let mut cmd = Command::new(&assembler);
        cmd.arg("--format")
            .arg("cbm")
            .arg("--outfile")
            .arg(output)
            .arg(source);

        if self.config.capture_output {
            cmd.stdout(Stdio::null()).stderr(Stdio::piped());
        }

        let child = cmd.spawn().map_err(SidError::SpawnFailed)?;
        let (status, stderr) =
            wait_with_timeout(child, self.config.timeout, self.config.capture_output)?;

        if !status.success() {
            let exit_code = status.code().unwrap_or(-1);
            return Err(SidError::assembler_failed(exit_code, stderr.trim()));
        }

        if !output.exists() {
            return Err(SidError::OutputNotFound {
                path: output.to_path_buf(),
            });
        }

        Ok(std::fs::read(output)?)
    }
}

fn wait_with_timeout(
    mut child: Child,
    timeout: Duration,
    capture_output: bool,
) -> SidResult<(ExitStatus, String)> {
    let start = Instant::now();

    // Drained while the child runs so a chatty assembler cannot fill the pipe.
    let reader = child
        .stderr
        .take()
        .filter(|_| capture_output)
        .map(|mut err| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = err.read_to_string(&mut buf);
                buf
            })
        });
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SidError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    });
                }
                thread::sleep(Duration::from_millis(20));
            }
            Err(e) => return Err(SidError::SpawnFailed(e)),
        }
    };

    let stderr = reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    Ok((status, stderr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = AssemblerConfig::default()
            .assembler_path("/opt/acme/acme")
            .timeout_secs(5);
        assert_eq!(config.assembler_path, Some(PathBuf::from("/opt/acme/acme")));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.capture_output);
    }

    #[test]
    fn test_configured_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("my-acme");
        std::fs::write(&fake, b"").unwrap();

        let assembler = Assembler::with_config(AssemblerConfig::default().assembler_path(&fake));
        assert_eq!(assembler.find().unwrap(), fake);
    }

    #[test]
    fn test_missing_configured_path_is_final() {
        let dir = tempfile::tempdir().unwrap();
        let elsewhere = dir.path().join("env-acme");
        std::fs::write(&elsewhere, b"").unwrap();
        std::env::set_var(ASSEMBLER_ENV, &elsewhere);

        let assembler = Assembler::with_config(
            AssemblerConfig::default().assembler_path(dir.path().join("no-such-acme")),
        );
        let result = assembler.find();
        std::env::remove_var(ASSEMBLER_ENV);

        assert!(matches!(result, Err(SidError::AssemblerNotFound)));
    }

    #[test]
    fn test_wait_with_timeout_captures_stderr() {
        let mut cmd = if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "echo hello 1>&2"]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", "echo hello 1>&2"]);
            cmd
        };

        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        let child = cmd.spawn().unwrap();

        let (status, stderr) = wait_with_timeout(child, Duration::from_secs(5), true).unwrap();
        assert!(status.success());
        assert!(stderr.to_lowercase().contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn test_large_stderr_does_not_stall() {
        let mut cmd = Command::new("sh");
        cmd.args([
            "-c",
            "head -c 200000 /dev/zero | tr '\\000' x 1>&2; exit 2",
        ]);
        cmd.stdout(Stdio::null()).stderr(Stdio::piped());
        let child = cmd.spawn().unwrap();

        let (status, stderr) = wait_with_timeout(child, Duration::from_secs(10), true).unwrap();
        assert_eq!(status.code(), Some(2));
        assert_eq!(stderr.len(), 200_000);
    }
}
