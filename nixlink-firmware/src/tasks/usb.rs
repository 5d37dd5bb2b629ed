//! USB task
//!
//! Builds the USB stack on the executor that runs it, then drives the
//! device alongside the CDC-ACM bridge that fills and drains the pipes the
//! poll loop reads and writes.

use defmt::*;
use embassy_futures::join::join;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_rp::Peri;
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::{Builder, Config as UsbConfig};
use nixlink_hal_rp2040::{run_cdc_bridge, UsbPipes};
use static_cell::StaticCell;

use crate::Irqs;

/// Capacity of each USB pipe in bytes
pub const USB_PIPE_SIZE: usize = 256;

pub type UsbLinkPipes = UsbPipes<USB_PIPE_SIZE>;

// USB descriptors and class state
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static CDC_STATE: StaticCell<State> = StaticCell::new();

/// USB task - owns the device and the serial class
///
/// Only the peripheral and the pipes cross the spawner; the driver, device
/// and class are created here and never leave this task.
#[embassy_executor::task]
pub async fn usb_task(usb: Peri<'static, USB>, pipes: &'static UsbLinkPipes) {
    let driver = Driver::new(usb, Irqs);

    let mut usb_config = UsbConfig::new(0x1209, 0x0001); // pid.codes test VID/PID
    usb_config.manufacturer = Some("nixlink");
    usb_config.product = Some("Nixie clock host link");
    usb_config.serial_number = Some("001");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        driver,
        usb_config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        MSOS_DESCRIPTOR.init([0; 256]),
        CONTROL_BUF.init([0; 64]),
    );
    let class = CdcAcmClass::new(&mut builder, CDC_STATE.init(State::new()), 64);
    let mut device = builder.build();

    info!("USB CDC bridge started");
    let run_device = async {
        device.run().await;
    };
    let run_bridge = async {
        run_cdc_bridge(class, pipes).await;
    };
    join(run_device, run_bridge).await;
}
