//! Link configuration
//!
//! Settings are read from a small TOML file embedded in the firmware image.
//! Anything the file leaves out keeps its default.

mod toml;
mod types;

pub use toml::{parse_config, ConfigError};
pub use types::{LinkConfig, PulseConfig, DEFAULT_BAUDRATE, DEFAULT_TICK_US};
