//! Player routines shared by both link layouts: init, tick, per-voice step
//! advance, and the data tables they read.

use crate::compile::CompiledSong;
use crate::pattern::{CompiledVoice, REST_SENTINEL};
use crate::registers::{
    voice, voice_register, FILTER_CUTOFF_HI, FILTER_CUTOFF_LO, FILTER_RES_ROUTING, MODE_VOLUME,
    REGISTER_COUNT, SID_BASE,
};

use super::{Mnemonic::*, Operand, Program};

/// Label of the song initializer.
pub const INIT_ROUTINE: &str = "init_song";

/// Label of the once-per-interrupt routine.
pub const TICK_ROUTINE: &str = "tick";

/// Master volume the fade-in ramps up to.
pub const VOLUME_CEILING: u8 = 0x0F;

/// Frequency table offset of each octave 0-5. Octaves below 2 never occur in
/// compiled tables.
const OCTAVE_OFFSETS: [u8; 6] = [0, 0, 0, 12, 24, 36];

fn voice_label(n: usize, name: &str) -> String {
    format!("v{}_{}", n, name)
}

/// Reset the SID, load filter and envelope registers, then prime every voice
/// so the first interrupt already has a note playing.
pub fn init_routine(song: &CompiledSong) -> Program {
    let filter = &song.filter;
    let mut p = Program::new();
    p.comment("reset SID, set filter and envelopes, prime voices")
        .label(INIT_ROUTINE)
        .op(Lda, Operand::imm(0))
        .op(Ldx, Operand::imm(REGISTER_COUNT - 1))
        .label("init_clear")
        .op(Sta, Operand::AbsoluteX(SID_BASE))
        .implied(Dex)
        .op(Bpl, Operand::label("init_clear"))
        .op(Sta, Operand::label("volume"))
        .op(Lda, Operand::imm(filter.cutoff_lo()))
        .op(Sta, Operand::abs(FILTER_CUTOFF_LO))
        .op(Lda, Operand::imm(filter.cutoff_hi()))
        .op(Sta, Operand::abs(FILTER_CUTOFF_HI))
        .op(Lda, Operand::imm(filter.resonance_routing()))
        .op(Sta, Operand::abs(FILTER_RES_ROUTING))
        .op(Lda, Operand::imm(filter.volume_base()))
        .op(Sta, Operand::abs(MODE_VOLUME));

    for (n, v) in song.voices.iter().enumerate() {
        let regs = &v.registers;
        p.op(Lda, Operand::imm(regs.attack_decay))
            .op(Sta, Operand::abs(voice_register(n, voice::ATTACK_DECAY)))
            .op(Lda, Operand::imm(regs.sustain_release))
            .op(Sta, Operand::abs(voice_register(n, voice::SUSTAIN_RELEASE)));
        if let Some(pw) = regs.pulse_width {
            p.op(Lda, Operand::imm(pw.lo))
                .op(Sta, Operand::abs(voice_register(n, voice::PW_LO)))
                .op(Lda, Operand::imm(pw.hi))
                .op(Sta, Operand::abs(voice_register(n, voice::PW_HI)));
        }
        p.op(Lda, Operand::imm(v.init_step as u8))
            .op(Sta, Operand::label(voice_label(n, "step")))
            .op(Jsr, Operand::label(voice_label(n, "advance")));
    }

    p.implied(Rts).blank();
    p
}

/// Fade the volume in, then count down each voice's timer and advance the
/// voice when it expires.
pub fn tick_routine(song: &CompiledSong) -> Program {
    let mut p = Program::new();
    p.comment("called once per frame")
        .label(TICK_ROUTINE)
        .op(Lda, Operand::label("volume"))
        .op(Cmp, Operand::imm(VOLUME_CEILING))
        .op(Beq, Operand::label("tick_volume"))
        .op(Inc, Operand::label("volume"))
        .label("tick_volume")
        .op(Lda, Operand::label("volume"))
        .op(Ora, Operand::imm(song.filter.volume_base()))
        .op(Sta, Operand::abs(MODE_VOLUME));

    let count = song.voices.len();
    for n in 0..count {
        let next = if n + 1 < count {
            format!("tick_v{}", n + 1)
        } else {
            "tick_done".to_string()
        };
        p.op(Dec, Operand::label(voice_label(n, "timer")))
            .op(Bne, Operand::label(next.clone()))
            .op(Jsr, Operand::label(voice_label(n, "advance")))
            .label(next);
    }

    p.implied(Rts).blank();
    p
}

/// Play the voice's current step, reload its timer, and move to the next
/// step, wrapping to 0 after the last one.
pub fn advance_routine(n: usize, v: &CompiledVoice) -> Program {
    let label = |name: &str| voice_label(n, name);
    let control = voice_register(n, voice::CONTROL);

    let mut p = Program::new();
    p.comment(format!("voice {} ({}) step advance", n + 1, v.role.as_str()))
        .label(label("advance"))
        .op(Ldx, Operand::label(label("step")))
        // gate off first so a repeated note restarts its envelope
        .op(Lda, Operand::imm(v.registers.control))
        .op(Sta, Operand::abs(control))
        .op(Lda, Operand::label_x(label("notes")))
        .op(Cmp, Operand::imm(REST_SENTINEL))
        .op(Beq, Operand::label(label("timing")))
        .implied(Clc)
        .op(Ldy, Operand::label_x(label("octaves")))
        .op(Adc, Operand::label_y("octave_offset"))
        .implied(Tay)
        .op(Lda, Operand::label_y("freq_lo"))
        .op(Sta, Operand::abs(voice_register(n, voice::FREQ_LO)))
        .op(Lda, Operand::label_y("freq_hi"))
        .op(Sta, Operand::abs(voice_register(n, voice::FREQ_HI)))
        .op(Lda, Operand::imm(v.registers.gate_on()))
        .op(Sta, Operand::abs(control))
        .label(label("timing"))
        .op(Lda, Operand::label_x(label("ticks")))
        .op(Sta, Operand::label(label("timer")))
        .implied(Inx)
        .op(Cpx, Operand::imm(v.len() as u8))
        .op(Bne, Operand::label(label("store")))
        .op(Ldx, Operand::imm(0))
        .label(label("store"))
        .op(Stx, Operand::label(label("step")))
        .implied(Rts)
        .blank();
    p
}

/// Frequency tables, per-voice step tables, and player state.
pub fn data_tables(song: &CompiledSong) -> Program {
    let mut p = Program::new();
    p.comment("frequency table, octaves 2-5")
        .table("octave_offset", OCTAVE_OFFSETS.to_vec())
        .table("freq_lo", song.frequencies.lo_bytes())
        .table("freq_hi", song.frequencies.hi_bytes())
        .blank();

    for (n, v) in song.voices.iter().enumerate() {
        p.comment(format!("voice {} tables, {} steps", n + 1, v.len()))
            .table(voice_label(n, "notes"), v.note_bytes())
            .table(voice_label(n, "octaves"), v.octaves.clone())
            .table(voice_label(n, "ticks"), v.ticks.clone())
            .blank();
    }

    p.comment("player state").table("volume", vec![0]);
    for n in 0..song.voices.len() {
        p.table(voice_label(n, "step"), vec![0])
            .table(voice_label(n, "timer"), vec![0]);
    }
    p
}

/// Init, tick, advance routines and data, in emission order.
pub fn player(song: &CompiledSong) -> Program {
    let mut p = Program::new();
    p.append(&init_routine(song)).append(&tick_routine(song));
    for (n, v) in song.voices.iter().enumerate() {
        p.append(&advance_routine(n, v));
    }
    p.append(&data_tables(song));
    p
}
