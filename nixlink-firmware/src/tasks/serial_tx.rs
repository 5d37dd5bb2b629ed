//! Serial transmit task
//!
//! Drains the bytes the poll loop queued for the host into UART0.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use nixlink_hal_rp2040::{pump_tx, SerialTxPipe};

/// Capacity of the serial transmit pipe in bytes (one full frame)
pub const SERIAL_TX_SIZE: usize = nixlink_protocol::MAX_FRAME_SIZE;

pub type SerialLinkTxPipe = SerialTxPipe<SERIAL_TX_SIZE>;

/// Serial TX task - writes queued bytes out of UART0
#[embassy_executor::task]
pub async fn serial_tx_task(mut tx: BufferedUartTx, pipe: &'static SerialLinkTxPipe) {
    info!("Serial TX task started");
    pump_tx(&mut tx, pipe).await
}
