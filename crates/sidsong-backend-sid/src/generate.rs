//! The compile pipeline: song in, assembly sources and PSID binary out.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sidsong_spec::Song;

use crate::asm::GeneratedSources;
use crate::compile::CompiledSong;
use crate::error::{SidError, SidResult};
use crate::psid;
use crate::toolchain::{Assembler, AssemblerConfig};

/// Every file derived from one output path `P`, with `base` being `P` minus
/// its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// `P`: standalone layout source.
    pub standalone_asm: PathBuf,
    /// `base_sid.asm`: library layout source.
    pub library_asm: PathBuf,
    /// `base_sid.prg`: assembled library image.
    pub library_prg: PathBuf,
    /// `base.sid`: packaged PSID binary.
    pub sid: PathBuf,
}

impl ArtifactPaths {
    pub fn from_output(output: &Path) -> Self {
        let base = output.with_extension("");
        let suffixed = |suffix: &str| {
            let mut name = OsString::from(base.as_os_str());
            name.push(suffix);
            PathBuf::from(name)
        };
        Self {
            standalone_asm: output.to_path_buf(),
            library_asm: suffixed("_sid.asm"),
            library_prg: suffixed("_sid.prg"),
            sid: suffixed(".sid"),
        }
    }

    /// Fails when two artifacts would share one file.
    pub fn check_distinct(&self) -> SidResult<()> {
        let all = [
            &self.standalone_asm,
            &self.library_asm,
            &self.library_prg,
            &self.sid,
        ];
        for (i, path) in all.iter().enumerate() {
            if all[i + 1..].contains(path) {
                return Err(SidError::OutputConflict {
                    path: (*path).clone(),
                });
            }
        }
        Ok(())
    }
}

/// A packaged PSID file and its BLAKE3 hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedSid {
    pub path: PathBuf,
    pub size: usize,
    pub hash: String,
}

/// Result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateResult {
    pub paths: ArtifactPaths,
    /// `None` when no assembler was available and packaging was skipped.
    pub packaged: Option<PackagedSid>,
}

impl GenerateResult {
    /// Paths of the files actually written.
    pub fn written(&self) -> Vec<&Path> {
        let mut written = vec![
            self.paths.standalone_asm.as_path(),
            self.paths.library_asm.as_path(),
        ];
        if self.packaged.is_some() {
            written.push(self.paths.library_prg.as_path());
            written.push(self.paths.sid.as_path());
        }
        written
    }
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> SidResult<()> {
    fs::write(path, contents).map_err(|e| SidError::write_failed(path, e))
}

fn remove_stale(path: &Path) -> SidResult<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            log::debug!("removed stale {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SidError::write_failed(path, e)),
    }
}

/// Compile `song`, write both assembly layouts next to `output`, then
/// assemble and package the library layout.
///
/// A missing assembler is not an error: the sources are still written and
/// `packaged` is `None`. Any other assembler failure leaves the sources on
/// disk and returns the error without writing a `.sid`. Image and `.sid`
/// files left by an earlier run are removed first.
pub fn generate(song: &Song, output: &Path, config: &AssemblerConfig) -> SidResult<GenerateResult> {
    let paths = ArtifactPaths::from_output(output);
    paths.check_distinct()?;

    let compiled = CompiledSong::compile(song);
    log::debug!(
        "filter: cutoff {} resonance {} routing {:#05b} mode {:#04x}",
        compiled.filter.cutoff,
        compiled.filter.resonance,
        compiled.filter.routing,
        compiled.filter.mode
    );

    let sources = GeneratedSources::render(&compiled);
    write_file(&paths.standalone_asm, &sources.standalone)?;
    log::info!("wrote {}", paths.standalone_asm.display());
    write_file(&paths.library_asm, &sources.library)?;
    log::info!("wrote {}", paths.library_asm.display());

    remove_stale(&paths.library_prg)?;
    remove_stale(&paths.sid)?;

    let assembler = Assembler::with_config(config.clone());
    let image = match assembler.assemble(&paths.library_asm, &paths.library_prg) {
        Ok(image) => image,
        Err(e) if e.is_toolchain_unavailable() => {
            log::warn!("{}; skipping {}", e, paths.sid.display());
            return Ok(GenerateResult {
                paths,
                packaged: None,
            });
        }
        Err(e) => return Err(e),
    };

    let sid = psid::package(&image, song.metadata());
    write_file(&paths.sid, &sid)?;
    let hash = blake3::hash(&sid).to_hex().to_string();
    log::info!("wrote {} ({} bytes)", paths.sid.display(), sid.len());

    let packaged = PackagedSid {
        path: paths.sid.clone(),
        size: sid.len(),
        hash,
    };
    Ok(GenerateResult {
        paths,
        packaged: Some(packaged),
    })
}
