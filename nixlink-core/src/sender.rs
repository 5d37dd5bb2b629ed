//! Outbound frame writer
//!
//! Serializes messages byte by byte through the blocking write primitive of
//! a [`ByteTransport`].

use nixlink_hal::ByteTransport;
use nixlink_protocol::{FrameError, Message};

/// Errors from sending a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError<E> {
    /// The message could not be built
    Frame(FrameError),
    /// The transport refused a byte; the frame on the wire is truncated
    Transport(E),
}

impl<E> From<FrameError> for SendError<E> {
    fn from(err: FrameError) -> Self {
        SendError::Frame(err)
    }
}

/// Frame writer borrowing a transport
pub struct FrameSender<'a, T> {
    transport: &'a mut T,
}

impl<'a, T: ByteTransport> FrameSender<'a, T> {
    pub fn new(transport: &'a mut T) -> Self {
        Self { transport }
    }

    /// Write a message as it stands, checksum included
    pub fn send(&mut self, message: &Message) -> Result<(), SendError<T::Error>> {
        for byte in message.frame_bytes() {
            self.transport.write_byte(byte).map_err(SendError::Transport)?;
        }
        Ok(())
    }

    /// Send an empty message carrying only `identifier`
    pub fn reply(&mut self, identifier: u16) -> Result<(), SendError<T::Error>> {
        self.send(&Message::empty(identifier))
    }

    /// Send a sealed message with `identifier` and `payload`
    pub fn reply_with(&mut self, identifier: u16, payload: &[u8]) -> Result<(), SendError<T::Error>> {
        let message = Message::new(identifier, payload)?;
        self.send(&message)
    }

    /// Access the underlying transport
    pub fn transport(&mut self) -> &mut T {
        self.transport
    }
}
