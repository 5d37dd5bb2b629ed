//! Async tasks
//!
//! All of these run on the interrupt executor, preempting the poll loop.

mod serial_rx;
mod serial_tx;
mod usb;

pub use serial_rx::{serial_rx_task, SerialQueueProducer, SERIAL_RX_SLOTS};
pub use serial_tx::{serial_tx_task, SerialLinkTxPipe, SERIAL_TX_SIZE};
pub use usb::{usb_task, UsbLinkPipes, USB_PIPE_SIZE};
