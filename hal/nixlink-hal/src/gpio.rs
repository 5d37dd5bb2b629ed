//! GPIO output abstractions
//!
//! The link only drives outputs: the activity and error LEDs.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }
}

/// Adapter for any `embedded-hal` 1.0 output pin
///
/// LED pins are infallible on every supported chip, so pin errors are
/// discarded.
pub struct HalPin<P>(pub P);

impl<P: embedded_hal::digital::OutputPin> OutputPin for HalPin<P> {
    fn set_high(&mut self) {
        let _ = self.0.set_high();
    }

    fn set_low(&mut self) {
        let _ = self.0.set_low();
    }
}
