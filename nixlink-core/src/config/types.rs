//! Link configuration types

use nixlink_hal::TransportKind;
use nixlink_protocol::RESYNC_TIMEOUT_TICKS;

use super::ConfigError;
use crate::dispatcher::{
    ACTIVITY_PULSE_TICKS, CHECKSUM_ERROR_PULSE_TICKS, UNIMPLEMENTED_PULSE_TICKS,
};

/// Serial line rate used when the file does not set one
pub const DEFAULT_BAUDRATE: u32 = 115_200;

/// Length of one link tick in microseconds
pub const DEFAULT_TICK_US: u32 = 10;

/// Indicator pulse lengths in link ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseConfig {
    /// Activity LED, per received byte
    pub activity: u32,
    /// Error LED, per checksum failure or rejected frame
    pub checksum_error: u32,
    /// Error LED, per unimplemented command
    pub unimplemented: u32,
}

impl PulseConfig {
    pub const fn new() -> Self {
        Self {
            activity: ACTIVITY_PULSE_TICKS,
            checksum_error: CHECKSUM_ERROR_PULSE_TICKS,
            unimplemented: UNIMPLEMENTED_PULSE_TICKS,
        }
    }
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Byte transport brought up at boot
    pub transport: TransportKind,
    /// UART line rate (ignored for USB)
    pub baudrate: u32,
    /// Microseconds per link tick
    pub tick_us: u32,
    /// Partial frames older than this are discarded
    pub resync_timeout_ticks: u32,
    pub pulses: PulseConfig,
}

impl LinkConfig {
    pub const fn new() -> Self {
        Self {
            transport: TransportKind::Serial,
            baudrate: DEFAULT_BAUDRATE,
            tick_us: DEFAULT_TICK_US,
            resync_timeout_ticks: RESYNC_TIMEOUT_TICKS,
            pulses: PulseConfig::new(),
        }
    }

    /// Reject settings the link cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baudrate == 0 || self.tick_us == 0 || self.resync_timeout_ticks == 0 {
            return Err(ConfigError::InvalidValue);
        }
        Ok(())
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_link_timing() {
        let config = LinkConfig::default();
        assert_eq!(config.transport, TransportKind::Serial);
        assert_eq!(config.baudrate, 115_200);
        assert_eq!(config.resync_timeout_ticks, 10_000);
        assert_eq!(config.pulses.activity, 200);
        assert_eq!(config.pulses.checksum_error, 10_000);
        assert_eq!(config.pulses.unimplemented, 40_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_tick_rejected() {
        let config = LinkConfig {
            tick_us: 0,
            ..LinkConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidValue));
    }
}
