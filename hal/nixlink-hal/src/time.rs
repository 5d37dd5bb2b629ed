//! Link clock abstraction
//!
//! The link counts time in abstract ticks. The resync timeout and the LED
//! pulse lengths are specified in ticks; the board decides how long a tick
//! is.

/// Monotonic tick counter
///
/// Wraps at `u32::MAX`; consumers must use wrapping arithmetic.
pub trait TickClock {
    /// Current tick count
    fn now(&self) -> u32;
}

impl<T: TickClock + ?Sized> TickClock for &T {
    fn now(&self) -> u32 {
        T::now(self)
    }
}

/// Ticks elapsed between `since` and `now`, tolerant of counter wrap
#[inline]
pub fn ticks_since(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}
