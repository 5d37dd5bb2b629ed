//! Status indicator trait
//!
//! Two LEDs report link health: the activity LED blinks for every received
//! byte, the error LED for every rejected frame or unknown command.
//!
//! Pulses never block. Starting one switches the LED on and records a
//! deadline; [`Indicators::update`] switches it off once the deadline has
//! passed. The poll loop calls `update` on every iteration, so a pulse ends
//! within one poll of its nominal length.

use nixlink_hal::{ticks_since, OutputPin};

/// Which indicator to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Indicator {
    /// Byte activity ("sys" LED)
    Activity,
    /// Errors ("usr" LED)
    Error,
}

/// Trait for the indicator driver
pub trait Indicators {
    /// Switch an indicator on for `ticks` link ticks, starting at `now`
    ///
    /// Returns immediately. A pulse already running on the same indicator
    /// is extended, never shortened.
    fn pulse(&mut self, which: Indicator, ticks: u32, now: u32);

    /// Switch off every indicator whose pulse has run its length
    fn update(&mut self, now: u32);
}

/// A running pulse
#[derive(Debug, Clone, Copy)]
struct Pulse {
    started: u32,
    ticks: u32,
}

impl Pulse {
    fn remaining(&self, now: u32) -> u32 {
        self.ticks.saturating_sub(ticks_since(now, self.started))
    }
}

/// One LED and its running pulse, if any
struct Led<P> {
    pin: P,
    pulse: Option<Pulse>,
}

impl<P: OutputPin> Led<P> {
    fn new(mut pin: P) -> Self {
        pin.set_low();
        Self { pin, pulse: None }
    }

    fn start(&mut self, ticks: u32, now: u32) {
        if let Some(running) = self.pulse {
            if running.remaining(now) >= ticks {
                return;
            }
        }
        self.pin.set_high();
        self.pulse = Some(Pulse {
            started: now,
            ticks,
        });
    }

    fn update(&mut self, now: u32) {
        if let Some(running) = self.pulse {
            if running.remaining(now) == 0 {
                self.pin.set_low();
                self.pulse = None;
            }
        }
    }
}

/// Indicators on two GPIO-driven LEDs
pub struct LedIndicators<A, E> {
    activity: Led<A>,
    error: Led<E>,
}

impl<A: OutputPin, E: OutputPin> LedIndicators<A, E> {
    /// Create the driver; both LEDs start off
    pub fn new(activity: A, error: E) -> Self {
        Self {
            activity: Led::new(activity),
            error: Led::new(error),
        }
    }

    /// Whether an indicator is currently lit
    pub fn is_lit(&self, which: Indicator) -> bool {
        match which {
            Indicator::Activity => self.activity.pulse.is_some(),
            Indicator::Error => self.error.pulse.is_some(),
        }
    }
}

impl<A: OutputPin, E: OutputPin> Indicators for LedIndicators<A, E> {
    fn pulse(&mut self, which: Indicator, ticks: u32, now: u32) {
        match which {
            Indicator::Activity => self.activity.start(ticks, now),
            Indicator::Error => self.error.start(ticks, now),
        }
    }

    fn update(&mut self, now: u32) {
        self.activity.update(now);
        self.error.update(now);
    }
}
