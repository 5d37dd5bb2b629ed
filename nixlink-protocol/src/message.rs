//! The protocol message.
//!
//! A [`Message`] owns fixed storage for the largest allowed payload, so the
//! decoder can rebuild one in place frame after frame without allocating.

use crate::checksum::message_checksum;
use crate::frame::{frame_size, FrameError, MAX_PAYLOAD_SIZE, SYNC_0, SYNC_1};

/// A decoded or outbound message
///
/// The sync marker is not stored: it is implied on the wire and validated
/// by the decoder.
#[derive(Clone)]
pub struct Message {
    pub(crate) identifier: u16,
    pub(crate) payload_len: u16,
    pub(crate) payload: [u8; MAX_PAYLOAD_SIZE],
    pub(crate) checksum: u16,
}

impl Message {
    /// A message with no identifier, no payload and a zero checksum
    ///
    /// This is the decoder's blank slate; it is not a sealed message.
    pub const fn blank() -> Self {
        Self {
            identifier: 0,
            payload_len: 0,
            payload: [0; MAX_PAYLOAD_SIZE],
            checksum: 0,
        }
    }

    /// Create a sealed message with the given identifier and payload
    pub fn new(identifier: u16, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }

        let mut message = Self::blank();
        message.identifier = identifier;
        message.payload_len = payload.len() as u16;
        message.payload[..payload.len()].copy_from_slice(payload);
        message.seal();
        Ok(message)
    }

    /// Create a sealed message with no payload
    pub fn empty(identifier: u16) -> Self {
        let mut message = Self::blank();
        message.identifier = identifier;
        message.seal();
        message
    }

    /// Message identifier
    #[inline]
    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    /// Payload bytes
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.payload_len as usize]
    }

    /// Payload length as carried in the length field
    #[inline]
    pub fn payload_len(&self) -> u16 {
        self.payload_len
    }

    /// Checksum as received (or as last sealed)
    #[inline]
    pub fn checksum(&self) -> u16 {
        self.checksum
    }

    /// Overwrite the stored checksum without recomputing it
    pub fn set_checksum(&mut self, checksum: u16) {
        self.checksum = checksum;
    }

    /// Checksum computed over identifier, length and payload
    pub fn compute_checksum(&self) -> u16 {
        message_checksum(self.identifier, self.payload())
    }

    /// Whether the stored checksum matches the content
    pub fn is_valid(&self) -> bool {
        self.checksum == self.compute_checksum()
    }

    /// Stamp the computed checksum into the message
    pub fn seal(&mut self) {
        self.checksum = self.compute_checksum();
    }

    /// Return to the blank state, keeping the storage
    pub(crate) fn clear(&mut self) {
        self.identifier = 0;
        self.payload_len = 0;
        self.checksum = 0;
    }

    /// Encoded size of this message on the wire
    pub fn frame_len(&self) -> usize {
        frame_size(self.payload_len as usize)
    }

    /// Wire bytes in transmission order
    ///
    /// The stored checksum is emitted as-is; call [`Message::seal`] first if
    /// the content was changed.
    pub fn frame_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        let [id_lo, id_hi] = self.identifier.to_le_bytes();
        let [len_lo, len_hi] = self.payload_len.to_le_bytes();

        [SYNC_0, SYNC_1, id_lo, id_hi, len_lo, len_hi]
            .into_iter()
            .chain(self.payload().iter().copied())
            .chain(self.checksum.to_le_bytes())
    }

    /// Encode this message into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.frame_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        for (slot, byte) in buffer.iter_mut().zip(self.frame_bytes()) {
            *slot = byte;
        }

        Ok(frame_len)
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::blank()
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
            && self.checksum == other.checksum
            && self.payload() == other.payload()
    }
}

impl Eq for Message {}

impl core::fmt::Debug for Message {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Message")
            .field("identifier", &self.identifier)
            .field("payload", &self.payload())
            .field("checksum", &self.checksum)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Message {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Message(id={=u16:#x}, payload={=[u8]}, checksum={=u16:#x})",
            self.identifier,
            self.payload(),
            self.checksum
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_encode_empty_payload() {
        let message = Message::empty(1);
        let mut buffer = [0u8; 16];
        let len = message.encode(&mut buffer).unwrap();

        assert_eq!(len, 8);
        assert_eq!(
            &buffer[..len],
            &[SYNC_0, SYNC_1, 0x01, 0x00, 0x00, 0x00, 0x01, 0x04]
        );
    }

    #[test]
    fn test_message_encode_with_payload() {
        let message = Message::new(0x1234, &[0xAA, 0xBB, 0xCC]).unwrap();
        let mut buffer = [0u8; 16];
        let len = message.encode(&mut buffer).unwrap();

        assert_eq!(len, 11);
        assert_eq!(buffer[2], 0x34); // identifier low
        assert_eq!(buffer[3], 0x12); // identifier high
        assert_eq!(buffer[4], 3); // length low
        assert_eq!(buffer[5], 0); // length high
        assert_eq!(&buffer[6..9], &[0xAA, 0xBB, 0xCC]);
        assert_eq!(
            u16::from_le_bytes([buffer[9], buffer[10]]),
            message.compute_checksum()
        );
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let message = Message::new(7, &[1, 2, 3]).unwrap();
        let mut buffer = [0u8; 10];
        assert_eq!(message.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_payload_too_large() {
        let large_payload = [0u8; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(
            Message::new(0x21, &large_payload),
            Err(FrameError::PayloadTooLarge)
        );
        assert!(Message::new(0x21, &large_payload[..MAX_PAYLOAD_SIZE]).is_ok());
    }

    #[test]
    fn test_tampered_message_is_invalid() {
        let mut message = Message::new(9, b"tick").unwrap();
        assert!(message.is_valid());

        message.set_checksum(message.checksum() ^ 0x0100);
        assert!(!message.is_valid());

        message.seal();
        assert!(message.is_valid());
    }

    #[test]
    fn test_equality_ignores_stale_storage() {
        let mut reused = Message::new(3, &[9, 9, 9, 9]).unwrap();
        reused.clear();
        reused.identifier = 3;
        reused.payload_len = 1;
        reused.payload[0] = 5;
        reused.seal();

        assert_eq!(reused, Message::new(3, &[5]).unwrap());
    }
}
