//! The two link layouts wrapped around the shared player.
//!
//! - **Standalone**: a BASIC-startable program that installs its own raster
//!   interrupt and calls the player every frame.
//! - **Library**: a PSID-compatible image with `init` at `$1000` and `play`
//!   at `$1003`, called by an external player.

use crate::compile::CompiledSong;

use super::routines::{player, INIT_ROUTINE, TICK_ROUTINE};
use super::{Mnemonic::*, Operand, Program};

/// Load address of the library layout; also the PSID init address.
pub const LIBRARY_LOAD: u16 = 0x1000;

/// PSID play address: directly after the 3-byte `jmp` at the init address.
pub const LIBRARY_PLAY: u16 = LIBRARY_LOAD + 3;

/// Load address of the standalone layout (start of BASIC memory).
pub const STANDALONE_LOAD: u16 = 0x0801;

/// `10 SYS 2061`, followed by the end-of-program marker.
const BASIC_STUB: [u8; 12] = [
    0x0b, 0x08, 0x0a, 0x00, 0x9e, 0x32, 0x30, 0x36, 0x31, 0x00, 0x00, 0x00,
];

const CPU_PORT: u16 = 0x0001;
/// RAM everywhere except I/O at `$D000`.
const BANK_IO_ONLY: u8 = 0x35;
const CIA1_ICR: u16 = 0xDC0D;
const CIA2_ICR: u16 = 0xDD0D;
const VIC_CONTROL: u16 = 0xD011;
const VIC_RASTER: u16 = 0xD012;
const VIC_IRQ_STATUS: u16 = 0xD019;
const VIC_IRQ_ENABLE: u16 = 0xD01A;
const NMI_VECTOR: u16 = 0xFFFA;
const IRQ_VECTOR: u16 = 0xFFFE;

/// Assembly text for both layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSources {
    pub standalone: String,
    pub library: String,
}

impl GeneratedSources {
    pub fn render(song: &CompiledSong) -> Self {
        Self {
            standalone: standalone(song).render(),
            library: library(song).render(),
        }
    }
}

fn banner(p: &mut Program, song: &CompiledSong, layout: &str) {
    p.comment(format!("sidsong {} layout", layout))
        .comment(format!(
            "{} BPM, {} ticks per beat, voices: {}",
            song.bpm,
            song.ticks_per_beat,
            song.voices
                .iter()
                .map(|v| v.role.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))
        .blank();
}

/// Push A, X and Y.
fn save_registers(p: &mut Program) {
    p.implied(Pha).implied(Txa).implied(Pha).implied(Tya).implied(Pha);
}

/// Pull Y, X and A.
fn restore_registers(p: &mut Program) {
    p.implied(Pla).implied(Tay).implied(Pla).implied(Tax).implied(Pla);
}

/// Self-running program with its own frame interrupt.
pub fn standalone(song: &CompiledSong) -> Program {
    let mut p = Program::new();
    banner(&mut p, song, "standalone");
    p.org(STANDALONE_LOAD)
        .bytes(BASIC_STUB.to_vec())
        .blank()
        .label("start")
        .implied(Sei)
        .op(Lda, Operand::imm(BANK_IO_ONLY))
        .op(Sta, Operand::abs(CPU_PORT))
        .op(Lda, Operand::imm(0x7f))
        .op(Sta, Operand::abs(CIA1_ICR))
        .op(Sta, Operand::abs(CIA2_ICR))
        .op(Lda, Operand::abs(CIA1_ICR))
        .op(Lda, Operand::abs(CIA2_ICR))
        .op(Lda, Operand::ImmediateLo("irq".into()))
        .op(Sta, Operand::abs(IRQ_VECTOR))
        .op(Lda, Operand::ImmediateHi("irq".into()))
        .op(Sta, Operand::abs(IRQ_VECTOR + 1))
        .op(Lda, Operand::ImmediateLo("nmi".into()))
        .op(Sta, Operand::abs(NMI_VECTOR))
        .op(Lda, Operand::ImmediateHi("nmi".into()))
        .op(Sta, Operand::abs(NMI_VECTOR + 1))
        .op(Lda, Operand::imm(0x1b))
        .op(Sta, Operand::abs(VIC_CONTROL))
        .op(Lda, Operand::imm(0x00))
        .op(Sta, Operand::abs(VIC_RASTER))
        .op(Lda, Operand::imm(0x01))
        .op(Sta, Operand::abs(VIC_IRQ_ENABLE))
        .op(Sta, Operand::abs(VIC_IRQ_STATUS))
        .op(Jsr, Operand::label(INIT_ROUTINE))
        .implied(Cli)
        .label("idle")
        .op(Jmp, Operand::label("idle"))
        .blank()
        .comment("raster interrupt, once per frame")
        .label("irq");
    save_registers(&mut p);
    p.op(Lda, Operand::imm(0x01))
        .op(Sta, Operand::abs(VIC_IRQ_STATUS))
        .op(Jsr, Operand::label(TICK_ROUTINE));
    restore_registers(&mut p);
    p.label("nmi").implied(Rti).blank();

    p.append(&player(song));
    p
}

/// PSID image: `init` and `play` entry points at fixed addresses.
pub fn library(song: &CompiledSong) -> Program {
    let mut p = Program::new();
    banner(&mut p, song, "library");
    p.org(LIBRARY_LOAD)
        .label("init")
        .op(Jmp, Operand::label(INIT_ROUTINE))
        .label("play");
    save_registers(&mut p);
    p.op(Jsr, Operand::label(TICK_ROUTINE));
    restore_registers(&mut p);
    p.implied(Rts).blank();

    p.append(&player(song));
    p
}
