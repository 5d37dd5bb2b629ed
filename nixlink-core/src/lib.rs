//! Board-agnostic core of the host link
//!
//! This crate contains everything between the byte transport and the
//! command table that does not depend on a specific chip:
//!
//! - Indicator and command-evaluator traits
//! - Frame sender (outbound encoder over a byte transport)
//! - Poll dispatcher (decode, verify, dispatch, signal errors)
//! - Link configuration and its TOML-subset parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod dispatcher;
pub mod sender;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock;

pub use config::{parse_config, ConfigError, LinkConfig, PulseConfig};
pub use dispatcher::{
    DispatcherState, LinkStats, PollDispatcher, PollOutcome, ACTIVITY_PULSE_TICKS,
    CHECKSUM_ERROR_PULSE_TICKS, UNIMPLEMENTED_PULSE_TICKS,
};
pub use sender::{FrameSender, SendError};
pub use traits::{CommandEvaluator, Evaluation, Indicator, Indicators, LedIndicators};
