//! Envelope flags

/// Envelope flags (1 byte)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnvelopeFlags(pub u8);

impl EnvelopeFlags {
    pub const NONE: EnvelopeFlags = EnvelopeFlags(0);

    // Flag bits
    pub const RELIABLE: u8 = 0b0000_0001;
    pub const REFRESH: u8 = 0b0000_0010;

    #[inline]
    pub fn new(bits: u8) -> Self {
        EnvelopeFlags(bits)
    }

    /// Sender asked the transport for reliable delivery
    #[inline]
    pub fn is_reliable(self) -> bool {
        self.0 & Self::RELIABLE != 0
    }

    /// State message produced by the periodic refresh, not by a detected change
    #[inline]
    pub fn is_refresh(self) -> bool {
        self.0 & Self::REFRESH != 0
    }

    #[inline]
    pub fn set_reliable(&mut self, value: bool) {
        if value {
            self.0 |= Self::RELIABLE;
        } else {
            self.0 &= !Self::RELIABLE;
        }
    }

    #[inline]
    pub fn set_refresh(&mut self, value: bool) {
        if value {
            self.0 |= Self::REFRESH;
        } else {
            self.0 &= !Self::REFRESH;
        }
    }
}
