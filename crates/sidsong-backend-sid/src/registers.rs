//! SID register map and per-voice register encoding.

use sidsong_spec::{Adsr, Voice, Waveform};

/// Base address of the SID chip.
pub const SID_BASE: u16 = 0xD400;

/// Distance between consecutive voice register blocks.
pub const VOICE_STRIDE: u16 = 7;

/// Voice register offsets from the voice base.
pub mod voice {
    pub const FREQ_LO: u16 = 0;
    pub const FREQ_HI: u16 = 1;
    pub const PW_LO: u16 = 2;
    pub const PW_HI: u16 = 3;
    pub const CONTROL: u16 = 4;
    pub const ATTACK_DECAY: u16 = 5;
    pub const SUSTAIN_RELEASE: u16 = 6;
}

/// Filter cutoff, low 3 bits.
pub const FILTER_CUTOFF_LO: u16 = 0xD415;
/// Filter cutoff, high 8 bits.
pub const FILTER_CUTOFF_HI: u16 = 0xD416;
/// Resonance (high nibble) and voice routing (low nibble).
pub const FILTER_RES_ROUTING: u16 = 0xD417;
/// Filter mode (bits 4-6) and master volume (low nibble).
pub const MODE_VOLUME: u16 = 0xD418;

/// Number of SID registers cleared on init ($D400-$D418).
pub const REGISTER_COUNT: u8 = 0x19;

/// Gate bit of the control register.
pub const GATE: u8 = 0x01;

/// Address of a register of voice `n` (0-2).
pub fn voice_register(n: usize, offset: u16) -> u16 {
    SID_BASE + VOICE_STRIDE * n as u16 + offset
}

/// Pack attack and decay into one byte: `attack << 4 | decay`.
pub fn pack_attack_decay(adsr: &Adsr) -> u8 {
    (adsr.attack.get() << 4) | adsr.decay.get()
}

/// Pack sustain and release into one byte: `sustain << 4 | release`.
pub fn pack_sustain_release(adsr: &Adsr) -> u8 {
    (adsr.sustain.get() << 4) | adsr.release.get()
}

/// Control register value for a waveform with the gate bit clear.
pub fn control_base(waveform: Waveform) -> u8 {
    match waveform {
        Waveform::Tri => 0x10,
        Waveform::Saw => 0x20,
        Waveform::Pulse => 0x40,
        Waveform::Noise => 0x80,
    }
}

/// A 12-bit pulse width split across the two pulse width registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseWidthBytes {
    pub lo: u8,
    /// Only the low nibble is meaningful.
    pub hi: u8,
}

impl PulseWidthBytes {
    pub fn split(width: u16) -> Self {
        Self {
            lo: (width & 0xFF) as u8,
            hi: ((width >> 8) & 0x0F) as u8,
        }
    }
}

/// Register values a voice needs besides its note tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceRegisters {
    pub attack_decay: u8,
    pub sustain_release: u8,
    pub control: u8,
    /// Present only for pulse voices.
    pub pulse_width: Option<PulseWidthBytes>,
}

impl VoiceRegisters {
    pub fn encode(voice: &Voice) -> Self {
        let pulse_width = match voice.waveform {
            Waveform::Pulse => voice.pulse_width.map(PulseWidthBytes::split),
            _ => None,
        };
        Self {
            attack_decay: pack_attack_decay(&voice.adsr),
            sustain_release: pack_sustain_release(&voice.adsr),
            control: control_base(voice.waveform),
            pulse_width,
        }
    }

    /// Control value that starts the envelope.
    pub fn gate_on(&self) -> u8 {
        self.control | GATE
    }
}
