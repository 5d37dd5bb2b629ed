//! RP2040 implementations of the nixlink HAL traits
//!
//! - [`serial`] - UART transport: SPSC receive queue, pipe-buffered transmit
//! - [`usb`] - USB CDC-ACM transport bridged through embassy pipes
//! - [`time`] - Link clock on top of `embassy-time`

#![no_std]
#![deny(unsafe_code)]

pub mod serial;
pub mod time;
pub mod usb;

pub use serial::{
    pump_rx, pump_tx, to_uart_config, BufferedSerialTransport, SerialTxPipe, UART_WRITE_SPIN_LIMIT,
};
pub use time::EmbassyClock;
pub use usb::{run_cdc_bridge, UsbPipes, UsbSerialTransport, USB_WRITE_SPIN_LIMIT};
