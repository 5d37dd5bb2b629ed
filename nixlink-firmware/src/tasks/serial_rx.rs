//! Serial receive task
//!
//! Producer side of the receive queue: drains the buffered UART into the
//! link's SPSC queue as bytes arrive.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use nixlink_hal_rp2040::pump_rx;
use nixlink_protocol::queue::SERIAL_RX_CAPACITY;
use nixlink_protocol::RxProducer;

/// Backing slots of the serial receive queue (one stays empty)
pub const SERIAL_RX_SLOTS: usize = SERIAL_RX_CAPACITY + 1;

pub type SerialQueueProducer = RxProducer<'static, SERIAL_RX_SLOTS>;

/// Serial RX task - feeds the receive queue from UART0
#[embassy_executor::task]
pub async fn serial_rx_task(mut rx: BufferedUartRx, mut queue: SerialQueueProducer) {
    info!("Serial RX task started");
    pump_rx(&mut rx, &mut queue).await
}
