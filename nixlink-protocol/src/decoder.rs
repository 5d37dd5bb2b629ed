//! Byte-at-a-time frame decoder.
//!
//! The decoder is fed one byte per call and keeps its state between calls.
//! It does not verify the checksum: a completed message is handed out as
//! received and the caller decides what to do with a bad one.
//!
//! A partial frame that has not completed within the resync timeout is
//! dropped, so a truncated frame can delay recognition of the next one by
//! at most that long.

use crate::frame::{FrameError, MAX_PAYLOAD_SIZE, SYNC_0, SYNC_1};
use crate::message::Message;

/// Ticks a frame may take, from its first byte, before it is abandoned
pub const RESYNC_TIMEOUT_TICKS: u32 = 10_000;

/// Decoder position within a frame
///
/// Each state consumes exactly one byte, except `Payload` which consumes
/// one byte per payload position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecoderState {
    /// Waiting for SYNC_0
    AwaitSync0,
    /// Got SYNC_0, waiting for SYNC_1
    AwaitSync1,
    IdentifierLow,
    IdentifierHigh,
    LengthLow,
    LengthHigh,
    /// Reading payload bytes
    Payload,
    ChecksumLow,
    ChecksumHigh,
}

/// State machine for decoding incoming frames
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: DecoderState,
    /// Payload bytes still expected; holds the length low byte in `LengthHigh`
    remaining: u16,
    /// Tick at which the current frame attempt started
    started_at: u32,
    timeout_ticks: u32,
    message: Message,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create a decoder with the standard resync timeout
    pub const fn new() -> Self {
        Self::with_timeout(RESYNC_TIMEOUT_TICKS)
    }

    /// Create a decoder with a custom resync timeout
    pub const fn with_timeout(timeout_ticks: u32) -> Self {
        Self {
            state: DecoderState::AwaitSync0,
            remaining: 0,
            started_at: 0,
            timeout_ticks,
            message: Message::blank(),
        }
    }

    /// Drop any partial frame and wait for SYNC_0
    pub fn reset(&mut self) {
        self.state = DecoderState::AwaitSync0;
        self.remaining = 0;
        self.message.clear();
    }

    /// Current decoder state
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Whether the decoder is between frames
    pub fn is_idle(&self) -> bool {
        self.state == DecoderState::AwaitSync0
    }

    /// Abandon the current partial frame if it has outlived the timeout
    ///
    /// Returns `true` if a partial frame was discarded.
    pub fn expire(&mut self, now: u32) -> bool {
        if self.is_idle() {
            return false;
        }
        if now.wrapping_sub(self.started_at) > self.timeout_ticks {
            self.reset();
            return true;
        }
        false
    }

    /// Feed a single byte received at tick `now`
    ///
    /// Returns `Ok(Some(message))` when the byte completes a frame,
    /// `Ok(None)` when more bytes are needed, or
    /// `Err(FrameError::PayloadTooLarge)` when the length field exceeds the
    /// payload storage (the frame is dropped and the decoder resynchronizes).
    pub fn feed(&mut self, byte: u8, now: u32) -> Result<Option<&Message>, FrameError> {
        self.expire(now);

        match self.state {
            DecoderState::AwaitSync0 => {
                self.started_at = now;
                if byte == SYNC_0 {
                    self.state = DecoderState::AwaitSync1;
                }
            }
            DecoderState::AwaitSync1 => {
                self.state = if byte == SYNC_1 {
                    DecoderState::IdentifierLow
                } else {
                    DecoderState::AwaitSync0
                };
            }
            DecoderState::IdentifierLow => {
                self.message.identifier = u16::from(byte);
                self.state = DecoderState::IdentifierHigh;
            }
            DecoderState::IdentifierHigh => {
                self.message.identifier |= u16::from(byte) << 8;
                self.state = DecoderState::LengthLow;
            }
            DecoderState::LengthLow => {
                self.remaining = u16::from(byte);
                self.state = DecoderState::LengthHigh;
            }
            DecoderState::LengthHigh => {
                let length = self.remaining | (u16::from(byte) << 8);
                if usize::from(length) > MAX_PAYLOAD_SIZE {
                    self.reset();
                    return Err(FrameError::PayloadTooLarge);
                }

                self.message.payload_len = length;
                self.remaining = length;
                self.state = if length == 0 {
                    DecoderState::ChecksumLow
                } else {
                    DecoderState::Payload
                };
            }
            DecoderState::Payload => {
                let index = usize::from(self.message.payload_len - self.remaining);
                self.message.payload[index] = byte;
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.state = DecoderState::ChecksumLow;
                }
            }
            DecoderState::ChecksumLow => {
                self.message.checksum = u16::from(byte);
                self.state = DecoderState::ChecksumHigh;
            }
            DecoderState::ChecksumHigh => {
                self.message.checksum |= u16::from(byte) << 8;
                self.state = DecoderState::AwaitSync0;
                return Ok(Some(&self.message));
            }
        }

        Ok(None)
    }

    /// Feed multiple bytes, all stamped with the same tick
    ///
    /// Returns a copy of the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8], now: u32) -> Result<Option<Message>, FrameError> {
        for &byte in bytes {
            if let Some(message) = self.feed(byte, now)? {
                return Ok(Some(message.clone()));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MAX_FRAME_SIZE;
    use proptest::prelude::*;

    fn encoded(message: &Message) -> heapless::Vec<u8, MAX_FRAME_SIZE> {
        message.frame_bytes().collect()
    }

    #[test]
    fn test_decode_identifier_one() {
        let bytes = [SYNC_0, SYNC_1, 0x01, 0x00, 0x00, 0x00, 0x01, 0x04];
        let mut decoder = FrameDecoder::new();

        let message = decoder.feed_bytes(&bytes, 0).unwrap().unwrap();

        assert_eq!(message.identifier(), 1);
        assert_eq!(message.payload_len(), 0);
        assert_eq!(message.checksum(), 0x0401);
        assert!(message.is_valid());
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_decode_corrupted_checksum_is_delivered_but_invalid() {
        let bytes = [SYNC_0, SYNC_1, 0x01, 0x00, 0x00, 0x00, 0x01, 0x05];
        let mut decoder = FrameDecoder::new();

        let message = decoder.feed_bytes(&bytes, 0).unwrap().unwrap();

        assert_eq!(message.checksum(), 0x0501);
        assert!(!message.is_valid());
    }

    #[test]
    fn test_state_sequence() {
        let message = Message::new(0x0203, &[0xAA]).unwrap();
        let mut decoder = FrameDecoder::new();
        let expected = [
            DecoderState::AwaitSync1,
            DecoderState::IdentifierLow,
            DecoderState::IdentifierHigh,
            DecoderState::LengthLow,
            DecoderState::LengthHigh,
            DecoderState::Payload,
            DecoderState::ChecksumLow,
            DecoderState::ChecksumHigh,
            DecoderState::AwaitSync0,
        ];

        for (byte, state) in message.frame_bytes().zip(expected) {
            decoder.feed(byte, 0).unwrap();
            assert_eq!(decoder.state(), state);
        }
    }

    #[test]
    fn test_resync_after_garbage() {
        let frame = encoded(&Message::empty(0x24));
        let mut data = heapless::Vec::<u8, 32>::new();
        data.extend_from_slice(&[0x00, 0xFF, 0x12, SYNC_0, 0x34]).unwrap();
        data.extend_from_slice(&frame).unwrap();

        let mut decoder = FrameDecoder::new();
        let parsed = decoder.feed_bytes(&data, 0).unwrap().unwrap();

        assert_eq!(parsed.identifier(), 0x24);
    }

    #[test]
    fn test_bad_second_sync_falls_back() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(SYNC_0, 0).unwrap();
        decoder.feed(0x00, 0).unwrap();
        assert_eq!(decoder.state(), DecoderState::AwaitSync0);
    }

    #[test]
    fn test_sync_bytes_inside_payload_do_not_split_frame() {
        let payload = [SYNC_0, SYNC_1, 0x01, 0x00, 0x00, 0x00, 0x01, 0x04, SYNC_0];
        let message = Message::new(0x0042, &payload).unwrap();
        let bytes = encoded(&message);

        let mut decoder = FrameDecoder::new();
        let last = bytes.len() - 1;
        for &byte in &bytes[..last] {
            assert!(decoder.feed(byte, 0).unwrap().is_none());
        }
        let parsed = decoder.feed(bytes[last], 0).unwrap().unwrap();
        assert_eq!(parsed, &message);
    }

    #[test]
    fn test_oversized_length_rejected() {
        let too_long = (MAX_PAYLOAD_SIZE as u16 + 1).to_le_bytes();
        let mut decoder = FrameDecoder::new();
        decoder.feed_bytes(&[SYNC_0, SYNC_1, 0x10, 0x00, too_long[0]], 0).unwrap();

        assert_eq!(
            decoder.feed(too_long[1], 0),
            Err(FrameError::PayloadTooLarge)
        );
        assert!(decoder.is_idle());

        // The next good frame still decodes
        let frame = encoded(&Message::new(0x10, &[1, 2]).unwrap());
        let parsed = decoder.feed_bytes(&frame, 0).unwrap().unwrap();
        assert_eq!(parsed.payload(), &[1, 2]);
    }

    #[test]
    fn test_max_payload_accepted() {
        let message = Message::new(0xFFFF, &[0x5A; MAX_PAYLOAD_SIZE]).unwrap();
        let mut decoder = FrameDecoder::new();
        let parsed = decoder.feed_bytes(&encoded(&message), 0).unwrap().unwrap();
        assert_eq!(parsed, message);
    }

    #[test]
    fn test_timeout_discards_partial_frame() {
        let frame = encoded(&Message::new(0x0007, &[1, 2, 3]).unwrap());
        let mut decoder = FrameDecoder::new();

        // Half a frame, then silence
        decoder.feed_bytes(&frame[..5], 100).unwrap();
        assert_eq!(decoder.state(), DecoderState::LengthHigh);

        let late = 100 + RESYNC_TIMEOUT_TICKS + 1;
        // First late byte is treated as a SYNC_0 candidate
        decoder.feed(SYNC_0, late).unwrap();
        assert_eq!(decoder.state(), DecoderState::AwaitSync1);

        let parsed = decoder.feed_bytes(&frame[1..], late).unwrap().unwrap();
        assert_eq!(parsed.identifier(), 7);
    }

    #[test]
    fn test_no_timeout_at_exact_threshold() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(SYNC_0, 0).unwrap();
        assert!(!decoder.expire(RESYNC_TIMEOUT_TICKS));
        assert!(decoder.expire(RESYNC_TIMEOUT_TICKS + 1));
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_timeout_across_tick_wrap() {
        let start = u32::MAX - 10;
        let mut decoder = FrameDecoder::new();
        decoder.feed(SYNC_0, start).unwrap();

        assert!(!decoder.expire(start.wrapping_add(RESYNC_TIMEOUT_TICKS)));
        assert!(decoder.expire(start.wrapping_add(RESYNC_TIMEOUT_TICKS + 1)));
    }

    #[test]
    fn test_expire_is_noop_when_idle() {
        let mut decoder = FrameDecoder::with_timeout(5);
        assert!(!decoder.expire(1_000_000));
    }

    proptest! {
        #[test]
        fn prop_roundtrip(
            id in any::<u16>(),
            payload in proptest::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_SIZE),
        ) {
            let original = Message::new(id, &payload).unwrap();
            let mut decoder = FrameDecoder::new();
            let decoded = decoder.feed_bytes(&encoded(&original), 0).unwrap().unwrap();

            prop_assert_eq!(decoded.identifier(), id);
            prop_assert_eq!(decoded.payload(), &payload[..]);
            prop_assert_eq!(decoded.checksum(), original.checksum());
            prop_assert!(decoded.is_valid());
        }

        #[test]
        fn prop_noise_prefix_never_yields_spurious_frame(
            noise in proptest::collection::vec(any::<u8>().prop_filter("not sync", |b| *b != SYNC_0), 0..64),
            id in any::<u16>(),
            payload in proptest::collection::vec(any::<u8>(), 0..32),
        ) {
            let original = Message::new(id, &payload).unwrap();
            let frame = encoded(&original);
            let mut decoder = FrameDecoder::new();

            for &byte in &noise {
                prop_assert!(decoder.feed(byte, 0).unwrap().is_none());
            }
            let last = frame.len() - 1;
            for &byte in &frame[..last] {
                prop_assert!(decoder.feed(byte, 0).unwrap().is_none());
            }
            let decoded = decoder.feed(frame[last], 0).unwrap().cloned();
            prop_assert_eq!(decoded, Some(original));
        }
    }
}
