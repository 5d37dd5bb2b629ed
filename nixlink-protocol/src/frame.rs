//! Frame layout constants and errors.
//!
//! Frame format:
//! - SYNC_0, SYNC_1 (2 bytes): 0xB5 0x62 synchronization marker
//! - IDENTIFIER (2 bytes, LE): command / reply identifier
//! - LENGTH (2 bytes, LE): payload length (0-256)
//! - PAYLOAD (0-256 bytes): identifier-specific data
//! - CHECKSUM (2 bytes, LE): see [`crate::checksum`]

/// First frame synchronization byte
pub const SYNC_0: u8 = 0xB5;

/// Second frame synchronization byte
pub const SYNC_1: u8 = 0x62;

/// Maximum payload size in bytes
///
/// The length field can describe up to 65535 bytes; anything above this is
/// rejected on both encode and decode.
pub const MAX_PAYLOAD_SIZE: usize = 256;

/// Bytes before the payload (sync + identifier + length)
pub const HEADER_SIZE: usize = 6;

/// Bytes after the payload
pub const CHECKSUM_SIZE: usize = 2;

/// Maximum complete frame size (HEADER + MAX_PAYLOAD + CHECKSUM)
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD_SIZE + CHECKSUM_SIZE;

/// Errors that can occur during frame decoding or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload (or a decoded length field) exceeds [`MAX_PAYLOAD_SIZE`]
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Total encoded size of a frame carrying `payload_len` bytes
#[inline]
pub const fn frame_size(payload_len: usize) -> usize {
    HEADER_SIZE + payload_len + CHECKSUM_SIZE
}
