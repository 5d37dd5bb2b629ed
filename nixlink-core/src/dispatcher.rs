//! Poll dispatcher
//!
//! One [`PollDispatcher::poll`] call moves the link forward by at most one
//! received byte:
//!
//! 1. End indicator pulses that have run their length
//! 2. Expire a partial frame that has outlived the resync timeout
//! 3. Take one byte from the transport (activity pulse)
//! 4. Feed it to the decoder
//! 5. On a completed frame, verify the checksum and hand it to the
//!    command evaluator
//!
//! Failures never stop the loop; they are counted in [`LinkStats`] and
//! shown on the error indicator.

use nixlink_hal::{ByteTransport, TickClock};
use nixlink_protocol::{FrameDecoder, FrameError};

use crate::config::{LinkConfig, PulseConfig};
use crate::sender::FrameSender;
use crate::traits::{CommandEvaluator, Evaluation, Indicator, Indicators};

/// Activity pulse per received byte, in ticks
pub const ACTIVITY_PULSE_TICKS: u32 = 200;

/// Error pulse for a checksum mismatch or rejected frame, in ticks
pub const CHECKSUM_ERROR_PULSE_TICKS: u32 = 10_000;

/// Error pulse for an unimplemented command, in ticks
pub const UNIMPLEMENTED_PULSE_TICKS: u32 = 40_000;

/// Coarse dispatcher state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatcherState {
    /// Waiting for the start of a frame
    Idle,
    /// A frame is partially received
    Receiving,
}

/// What a single poll did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollOutcome {
    /// No frame in progress
    Idle,
    /// Mid-frame, more bytes needed
    Receiving,
    /// A verified frame was handled by the evaluator
    Dispatched(u16),
    /// A completed frame failed its checksum and was dropped
    ChecksumMismatch,
    /// A verified frame carried an identifier the evaluator does not know
    Unimplemented(u16),
    /// The decoder refused the frame header
    Rejected(FrameError),
}

/// Cumulative link counters
///
/// All counters wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    pub bytes_received: u32,
    /// Verified frames handed to the evaluator, implemented or not
    pub frames_dispatched: u32,
    pub checksum_failures: u32,
    pub unimplemented: u32,
    pub rejected: u32,
    /// Partial frames discarded by the resync timeout
    pub resyncs: u32,
}

/// Drives the receive side of the link
pub struct PollDispatcher<T, I, E, C> {
    transport: T,
    indicators: I,
    evaluator: E,
    clock: C,
    decoder: FrameDecoder,
    pulses: PulseConfig,
    stats: LinkStats,
}

impl<T, I, E, C> PollDispatcher<T, I, E, C>
where
    T: ByteTransport,
    I: Indicators,
    E: CommandEvaluator,
    C: TickClock,
{
    /// Create a dispatcher with the default timeout and pulse lengths
    pub fn new(transport: T, indicators: I, evaluator: E, clock: C) -> Self {
        Self {
            transport,
            indicators,
            evaluator,
            clock,
            decoder: FrameDecoder::new(),
            pulses: PulseConfig::new(),
            stats: LinkStats::default(),
        }
    }

    /// Create a dispatcher using the timing from `config`
    pub fn with_config(
        transport: T,
        indicators: I,
        evaluator: E,
        clock: C,
        config: &LinkConfig,
    ) -> Self {
        Self {
            decoder: FrameDecoder::with_timeout(config.resync_timeout_ticks),
            pulses: config.pulses,
            ..Self::new(transport, indicators, evaluator, clock)
        }
    }

    /// Advance the link by at most one byte
    pub fn poll(&mut self) -> PollOutcome {
        let now = self.clock.now();
        self.indicators.update(now);

        if self.decoder.expire(now) {
            self.stats.resyncs = self.stats.resyncs.wrapping_add(1);
            debug!("partial frame discarded after timeout");
        }

        let Some(byte) = self.transport.try_read_byte() else {
            return self.idle_outcome();
        };

        self.stats.bytes_received = self.stats.bytes_received.wrapping_add(1);
        self.indicators.pulse(Indicator::Activity, self.pulses.activity, now);

        // Stamp the byte after the indicator has had its turn
        let arrived = self.clock.now();
        let message = match self.decoder.feed(byte, arrived) {
            Ok(Some(message)) => message,
            Ok(None) => return self.idle_outcome(),
            Err(err) => {
                self.stats.rejected = self.stats.rejected.wrapping_add(1);
                warn!("frame rejected: {}", err);
                self.indicators.pulse(Indicator::Error, self.pulses.checksum_error, arrived);
                return PollOutcome::Rejected(err);
            }
        };

        let identifier = message.identifier();
        if !message.is_valid() {
            self.stats.checksum_failures = self.stats.checksum_failures.wrapping_add(1);
            warn!(
                "checksum mismatch on {=u16:#x}: got {=u16:#x}, expected {=u16:#x}",
                identifier,
                message.checksum(),
                message.compute_checksum()
            );
            self.indicators.pulse(Indicator::Error, self.pulses.checksum_error, arrived);
            return PollOutcome::ChecksumMismatch;
        }

        self.stats.frames_dispatched = self.stats.frames_dispatched.wrapping_add(1);
        let mut link = FrameSender::new(&mut self.transport);
        match self.evaluator.evaluate(message, &mut link) {
            Evaluation::Handled => {
                trace!("handled {=u16:#x}", identifier);
                PollOutcome::Dispatched(identifier)
            }
            Evaluation::Unimplemented => {
                self.stats.unimplemented = self.stats.unimplemented.wrapping_add(1);
                info!("unimplemented command {=u16:#x}", identifier);
                self.indicators.pulse(Indicator::Error, self.pulses.unimplemented, arrived);
                PollOutcome::Unimplemented(identifier)
            }
        }
    }

    /// Poll forever
    pub fn run(&mut self) -> ! {
        loop {
            self.poll();
        }
    }

    fn idle_outcome(&self) -> PollOutcome {
        match self.state() {
            DispatcherState::Idle => PollOutcome::Idle,
            DispatcherState::Receiving => PollOutcome::Receiving,
        }
    }
}

impl<T, I, E, C> PollDispatcher<T, I, E, C> {
    pub fn state(&self) -> DispatcherState {
        if self.decoder.is_idle() {
            DispatcherState::Idle
        } else {
            DispatcherState::Receiving
        }
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    pub fn pulses(&self) -> &PulseConfig {
        &self.pulses
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn indicators(&self) -> &I {
        &self.indicators
    }
}
