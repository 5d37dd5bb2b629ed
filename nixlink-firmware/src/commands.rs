//! Command table
//!
//! Maps message identifiers to handlers. Clock, timezone and tube display
//! commands are not part of this firmware and report as unimplemented.

use defmt::*;
use nixlink_core::{CommandEvaluator, Evaluation, FrameSender};
use nixlink_hal::ByteTransport;
use nixlink_protocol::Message;

/// Liveness check, answered with an empty frame
pub const PING: u16 = 0x0001;

/// Firmware version query, answered with the version string
pub const VERSION: u16 = 0x0002;

/// Firmware version reported by [`VERSION`]
const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commands implemented by this firmware
pub struct CommandTable;

impl CommandEvaluator for CommandTable {
    fn evaluate<T: ByteTransport>(
        &mut self,
        message: &Message,
        link: &mut FrameSender<'_, T>,
    ) -> Evaluation {
        let sent = match message.identifier() {
            PING => {
                trace!("PING");
                link.reply(PING)
            }
            VERSION => {
                debug!("VERSION -> {}", FIRMWARE_VERSION);
                link.reply_with(VERSION, FIRMWARE_VERSION.as_bytes())
            }
            _ => return Evaluation::Unimplemented,
        };

        if sent.is_err() {
            warn!("Reply to {=u16:#x} failed", message.identifier());
        }
        Evaluation::Handled
    }
}
