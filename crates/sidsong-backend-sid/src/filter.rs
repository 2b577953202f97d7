//! Filter reconciliation.
//!
//! The SID has a single filter shared by all voices, so the three per-voice
//! requests are merged into one configuration: the union of requested modes,
//! the highest resonance, the mean cutoff, and a routing bit per filtered voice.

use sidsong_spec::FilterRequest;

use crate::pattern::CompiledVoice;

/// Low-pass mode bit of `$D418`.
pub const MODE_LOW_PASS: u8 = 0x10;
/// Band-pass mode bit of `$D418`.
pub const MODE_BAND_PASS: u8 = 0x20;
/// High-pass mode bit of `$D418`.
pub const MODE_HIGH_PASS: u8 = 0x40;

/// The single global filter setup derived from all voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterConfig {
    /// 11-bit cutoff.
    pub cutoff: u16,
    pub resonance: u8,
    /// Bit `i` set when voice `i` passes through the filter.
    pub routing: u8,
    /// Mode bits, OR-ed with the live volume at runtime.
    pub mode: u8,
}

impl FilterConfig {
    /// Merge the voices' filter requests.
    pub fn reconcile(voices: &[CompiledVoice]) -> Self {
        Self::from_requests(voices.iter().map(|v| &v.filter))
    }

    /// Merge filter requests given in voice order.
    pub fn from_requests<'a, I>(requests: I) -> Self
    where
        I: IntoIterator<Item = &'a FilterRequest>,
    {
        let acc = requests
            .into_iter()
            .enumerate()
            .filter(|(_, req)| req.kind.is_active())
            .fold(Accumulator::default(), |acc, (i, req)| acc.add(i, req));

        let cutoff = if acc.requesting == 0 {
            0
        } else {
            (acc.cutoff_sum as f64 / acc.requesting as f64).round() as u16
        };

        let config = Self {
            cutoff,
            resonance: acc.resonance,
            routing: acc.routing,
            mode: acc.mode,
        };
        log::debug!(
            "reconciled filter: cutoff={} resonance={} routing={:#05b} mode={:#04x}",
            config.cutoff,
            config.resonance,
            config.routing,
            config.mode
        );
        config
    }

    /// Value for `$D415` (low 3 bits of the cutoff).
    pub fn cutoff_lo(&self) -> u8 {
        (self.cutoff & 0x07) as u8
    }

    /// Value for `$D416` (high 8 bits of the cutoff).
    pub fn cutoff_hi(&self) -> u8 {
        ((self.cutoff >> 3) & 0xFF) as u8
    }

    /// Value for `$D417`.
    pub fn resonance_routing(&self) -> u8 {
        (self.resonance << 4) | self.routing
    }

    /// Base value for `$D418`, before the volume nibble is OR-ed in.
    pub fn volume_base(&self) -> u8 {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.routing != 0
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    mode: u8,
    routing: u8,
    resonance: u8,
    cutoff_sum: u32,
    requesting: u32,
}

impl Accumulator {
    fn add(self, voice: usize, req: &FilterRequest) -> Self {
        let mut mode = self.mode;
        if req.kind.has_low_pass() {
            mode |= MODE_LOW_PASS;
        }
        if req.kind.has_band_pass() {
            mode |= MODE_BAND_PASS;
        }
        if req.kind.has_high_pass() {
            mode |= MODE_HIGH_PASS;
        }
        Self {
            mode,
            routing: self.routing | (1 << voice),
            resonance: self.resonance.max(req.resonance.get()),
            cutoff_sum: self.cutoff_sum + req.cutoff as u32,
            requesting: self.requesting + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidsong_spec::{FilterType, Nibble};

    fn request(kind: FilterType, cutoff: u16, resonance: u8) -> FilterRequest {
        FilterRequest {
            kind,
            cutoff,
            resonance: Nibble::new(resonance).unwrap(),
        }
    }

    #[test]
    fn test_no_filtering() {
        let reqs = [
            request(FilterType::None, 1500, 9),
            request(FilterType::None, 0, 0),
            request(FilterType::None, 200, 3),
        ];
        let config = FilterConfig::from_requests(&reqs);
        assert_eq!(config, FilterConfig::default());
        assert!(!config.is_active());
    }

    #[test]
    fn test_union_of_modes() {
        let reqs = [
            request(FilterType::LpBp, 1000, 4),
            request(FilterType::None, 2000, 15),
            request(FilterType::Hp, 500, 8),
        ];
        let config = FilterConfig::from_requests(&reqs);
        assert_eq!(config.mode, MODE_LOW_PASS | MODE_BAND_PASS | MODE_HIGH_PASS);
        assert_eq!(config.routing, 0b101);
        // The non-requesting voice's resonance and cutoff are ignored.
        assert_eq!(config.resonance, 8);
        assert_eq!(config.cutoff, 750);
    }

    #[test]
    fn test_cutoff_mean_rounds() {
        let reqs = [
            request(FilterType::Lp, 1, 0),
            request(FilterType::Lp, 2, 0),
            request(FilterType::None, 0, 0),
        ];
        assert_eq!(FilterConfig::from_requests(&reqs).cutoff, 2);
    }

    #[test]
    fn test_register_bytes() {
        let config = FilterConfig {
            cutoff: 0x7FF,
            resonance: 0xC,
            routing: 0b011,
            mode: MODE_LOW_PASS,
        };
        assert_eq!(config.cutoff_lo(), 0x07);
        assert_eq!(config.cutoff_hi(), 0xFF);
        assert_eq!(config.resonance_routing(), 0xC3);
        assert_eq!(config.volume_base(), 0x10);

        let config = FilterConfig {
            cutoff: 0x123,
            ..config
        };
        assert_eq!(config.cutoff_lo(), 0x03);
        assert_eq!(config.cutoff_hi(), 0x24);
    }
}
