//! sidsong SID Backend
//!
//! Compiles a validated [`sidsong_spec::Song`] for the MOS 6581/8580 SID chip:
//!
//! - note, tempo and envelope translation to register values
//! - filter reconciliation across the three voices
//! - 6502 assembly for a standalone program and a PSID library image
//! - ACME invocation and PSID v2 packaging
//!
//! Output is deterministic: the same song always yields byte-identical
//! assembly text and, given the same assembler, the same `.sid` file.
//!
//! # Example
//!
//! ```no_run
//! use sidsong_backend_sid::{generate, AssemblerConfig};
//! use sidsong_spec::Song;
//! use std::path::Path;
//!
//! let song = Song::from_path(Path::new("theme.json"))?;
//! let result = generate(&song, Path::new("theme.asm"), &AssemblerConfig::default())?;
//! if let Some(sid) = result.packaged {
//!     println!("{} {}", sid.path.display(), sid.hash);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod asm;
pub mod compile;
pub mod error;
pub mod filter;
pub mod generate;
pub mod note;
pub mod pattern;
pub mod psid;
pub mod registers;
pub mod toolchain;

pub use compile::CompiledSong;
pub use error::{SidError, SidResult};
pub use filter::FilterConfig;
pub use generate::{generate, ArtifactPaths, GenerateResult, PackagedSid};
pub use note::FrequencyTable;
pub use psid::PsidHeader;
pub use toolchain::{Assembler, AssemblerConfig, ASSEMBLER_ENV};

/// Backend version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
