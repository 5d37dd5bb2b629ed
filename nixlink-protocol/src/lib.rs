//! Host link framing protocol
//!
//! This crate defines the binary protocol spoken between the clock
//! controller and its host. It is transport-agnostic: it only turns bytes
//! into messages and messages into bytes.
//!
//! # Protocol Overview
//!
//! All messages use a single frame format (multi-byte fields little-endian):
//! ```text
//! ┌────────┬────────┬────────────┬────────┬─────────────┬──────────┐
//! │ SYNC_0 │ SYNC_1 │ IDENTIFIER │ LENGTH │ PAYLOAD     │ CHECKSUM │
//! │ 1B     │ 1B     │ 2B         │ 2B     │ 0–256B      │ 2B       │
//! └────────┴────────┴────────────┴────────┴─────────────┴──────────┘
//! ```
//!
//! The checksum is a two-accumulator running sum over identifier, length
//! and payload (see [`checksum`]).
//!
//! Receiving is split in two: an interrupt-fed [`queue::ReceiveQueue`]
//! buffers raw bytes, and a [`decoder::FrameDecoder`] consumes them one at a
//! time, dropping stalled partial frames after a tick timeout.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod checksum;
pub mod decoder;
pub mod frame;
pub mod message;
pub mod queue;

pub use checksum::{message_checksum, Checksum};
pub use decoder::{DecoderState, FrameDecoder, RESYNC_TIMEOUT_TICKS};
pub use frame::{FrameError, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE, SYNC_0, SYNC_1};
pub use message::Message;
pub use queue::{QueueError, ReceiveQueue, RxConsumer, RxProducer, SerialRxQueue};
