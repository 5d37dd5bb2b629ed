//! Link clock on top of `embassy-time`

use embassy_time::Instant;
use nixlink_hal::TickClock;

/// Link tick counter derived from the embassy time driver
#[derive(Debug, Clone, Copy)]
pub struct EmbassyClock {
    tick_us: u32,
}

impl EmbassyClock {
    /// Clock with `tick_us` microseconds per link tick (minimum 1)
    pub fn new(tick_us: u32) -> Self {
        Self {
            tick_us: tick_us.max(1),
        }
    }
}

impl TickClock for EmbassyClock {
    fn now(&self) -> u32 {
        // Truncation is the intended wrap
        (Instant::now().as_micros() / u64::from(self.tick_us)) as u32
    }
}
