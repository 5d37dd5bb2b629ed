//! nixlink Hardware Abstraction Layer
//!
//! This crate defines the narrow hardware interfaces the link core is
//! written against. Chip-specific HALs implement them; host tests mock them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  nixlink-core / nixlink-firmware        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  nixlink-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ nixlink-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`transport::ByteTransport`] - Byte-at-a-time serial link
//! - [`gpio::OutputPin`] - Status LEDs
//! - [`time::TickClock`] - Link clock, with [`time::ticks_since`] for wrapping intervals

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod time;
pub mod transport;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use time::{ticks_since, TickClock};
pub use transport::{
    retry_write, ByteTransport, SelectedTransport, TransportError, TransportKind, UartConfig,
};
