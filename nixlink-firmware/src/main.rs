//! nixlink - Host link firmware for the nixie clock controller
//!
//! Main firmware binary for the RP2040 controller board. Brings up one
//! byte transport (UART0 or USB CDC-ACM), then runs the framing protocol's
//! poll loop forever in thread mode. The only async work (UART receive and
//! transmit, USB stack) runs on an interrupt executor that preempts the loop.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::InterruptExecutor;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::{UART0, USB};
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use embassy_time::{block_for, Duration};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use nixlink_core::{parse_config, LedIndicators, LinkConfig, PollDispatcher};
use nixlink_hal::gpio::HalPin;
use nixlink_hal::{SelectedTransport, TransportKind, UartConfig};
use nixlink_hal_rp2040::{to_uart_config, BufferedSerialTransport, EmbassyClock, UsbSerialTransport};
use nixlink_protocol::SerialRxQueue;

use crate::commands::CommandTable;
use crate::tasks::{
    SerialLinkTxPipe, UsbLinkPipes, SERIAL_RX_SLOTS, SERIAL_TX_SIZE, USB_PIPE_SIZE,
};

mod commands;
mod tasks;

/// Embedded link configuration (compiled into firmware)
/// Edit link.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../link.toml");

/// Time for the strap pull-up to charge the pin before it is sampled
const STRAP_SETTLE_US: u64 = 10;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

type SerialLink = BufferedSerialTransport<'static, SERIAL_RX_SLOTS, SERIAL_TX_SIZE>;
type UsbLink = UsbSerialTransport<'static, USB_PIPE_SIZE>;
type Link = SelectedTransport<SerialLink, UsbLink>;

/// Executor for the UART and USB tasks; preempts the poll loop
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_QUEUE: StaticCell<SerialRxQueue> = StaticCell::new();
static SERIAL_TX: SerialLinkTxPipe = SerialLinkTxPipe::new();

// Pipes between the USB task and the poll loop
static USB_PIPES: UsbLinkPipes = UsbLinkPipes::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Main entry point
#[cortex_m_rt::entry]
fn main() -> ! {
    info!("nixlink firmware starting...");

    let p = embassy_rp::init(Default::default());

    let mut config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid link.toml ({}), using defaults", e);
            LinkConfig::default()
        }
    };

    // Strap: GPIO 22 held low at boot forces USB serial
    let strap = Input::new(p.PIN_22, Pull::Up);
    block_for(Duration::from_micros(STRAP_SETTLE_US));
    if strap.is_low() {
        info!("Strap pin low, forcing USB serial");
        config.transport = TransportKind::UsbSerial;
    }
    info!("Link config: {}", config);

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);

    let link: Link = match config.transport {
        TransportKind::Serial => {
            let uart_config = to_uart_config(&UartConfig {
                baudrate: config.baudrate,
                ..UartConfig::default()
            });

            let tx_buf = TX_BUF.init([0u8; 64]);
            let rx_buf = RX_BUF.init([0u8; 256]);

            let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
            let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
            let (tx, rx) = uart.split();

            let (producer, consumer) = RX_QUEUE.init(SerialRxQueue::new()).split();
            spawner.spawn(tasks::serial_rx_task(rx, producer)).unwrap();
            spawner.spawn(tasks::serial_tx_task(tx, &SERIAL_TX)).unwrap();

            info!("UART0 initialized at {} baud", config.baudrate);
            SelectedTransport::Serial(BufferedSerialTransport::new(consumer, &SERIAL_TX))
        }
        TransportKind::UsbSerial => {
            spawner.spawn(tasks::usb_task(p.USB, &USB_PIPES)).unwrap();

            info!("USB CDC-ACM initialized");
            SelectedTransport::UsbSerial(UsbSerialTransport::new(&USB_PIPES))
        }
    };

    // Status LEDs: sys (activity) on the on-board LED, usr (errors) on GPIO 16
    let leds = LedIndicators::new(
        HalPin(Output::new(p.PIN_25, Level::Low)),
        HalPin(Output::new(p.PIN_16, Level::Low)),
    );

    let mut dispatcher = PollDispatcher::with_config(
        link,
        leds,
        CommandTable,
        EmbassyClock::new(config.tick_us),
        &config,
    );

    info!("Link up, polling");
    loop {
        dispatcher.poll();

        if let SelectedTransport::Serial(serial) = dispatcher.transport() {
            let dropped = serial.take_dropped();
            if dropped > 0 {
                warn!("Receive queue overflow: {} bytes dropped", dropped);
            }
        }
    }
}
