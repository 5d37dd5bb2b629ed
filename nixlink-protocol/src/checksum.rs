//! Two-accumulator frame checksum.
//!
//! For every byte `x` covered by the checksum (identifier low/high, length
//! low/high, then the payload):
//!
//! ```text
//! a = a + x   (mod 256)
//! b = b + a   (mod 256)
//! checksum = (b << 8) | a
//! ```
//!
//! Order-sensitive and cheap. It catches line noise, not tampering.

/// Incremental checksum digest
///
/// Feed bytes in wire order, then read [`Checksum::value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Checksum {
    a: u8,
    b: u8,
}

impl Checksum {
    /// Start a new digest with both accumulators at zero.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { a: 0, b: 0 }
    }

    /// Fold a single byte into the digest.
    #[inline]
    pub fn update(&mut self, byte: u8) {
        self.a = self.a.wrapping_add(byte);
        self.b = self.b.wrapping_add(self.a);
    }

    /// Fold a byte slice into the digest.
    #[inline]
    pub fn update_slice(&mut self, data: &[u8]) {
        for &byte in data {
            self.update(byte);
        }
    }

    /// Current checksum value, `(b << 8) | a`.
    #[inline]
    #[must_use]
    pub fn value(&self) -> u16 {
        u16::from_le_bytes([self.a, self.b])
    }
}

/// Checksum of a message with the given identifier and payload.
///
/// The length field is derived from `payload.len()`; callers must have
/// bounded the payload already.
#[must_use]
pub fn message_checksum(identifier: u16, payload: &[u8]) -> u16 {
    let mut digest = Checksum::new();
    digest.update_slice(&identifier.to_le_bytes());
    digest.update_slice(&(payload.len() as u16).to_le_bytes());
    digest.update_slice(payload);
    digest.value()
}
