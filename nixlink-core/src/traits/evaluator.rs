//! Command evaluator trait
//!
//! The evaluator is the command table: it receives every checksum-valid
//! message and decides whether it knows the identifier.

use nixlink_hal::ByteTransport;
use nixlink_protocol::Message;

use crate::sender::FrameSender;

/// Result of evaluating a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Evaluation {
    /// Identifier recognised and acted on
    Handled,
    /// Identifier not implemented by this firmware
    Unimplemented,
}

/// Trait for command tables
///
/// Implementations may answer the host through `link`. A failed reply is the
/// evaluator's to log; it does not change the evaluation.
pub trait CommandEvaluator {
    /// Act on a verified message
    fn evaluate<T: ByteTransport>(
        &mut self,
        message: &Message,
        link: &mut FrameSender<'_, T>,
    ) -> Evaluation;
}
