//! USB CDC-ACM transport
//!
//! The USB stack is async; the poll loop is not. Two pipes sit between
//! them: [`run_cdc_bridge`] moves packets between the CDC class and the
//! pipes, and [`UsbSerialTransport`] touches only the pipes' non-blocking
//! ends.

use embassy_futures::select::select;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;
use embassy_usb::class::cdc_acm::{CdcAcmClass, Receiver, Sender};
use embassy_usb::driver::{Driver, EndpointError};
use nixlink_hal::{retry_write, ByteTransport, TransportError};
use portable_atomic::{AtomicBool, Ordering};

/// Attempts at queueing one outbound byte before giving up
pub const USB_WRITE_SPIN_LIMIT: u32 = 100_000;

/// Full-speed bulk packet size
const MAX_PACKET_SIZE: usize = 64;

/// Pipes shared between the USB bridge task and the poll loop
pub struct UsbPipes<const N: usize> {
    rx: Pipe<CriticalSectionRawMutex, N>,
    tx: Pipe<CriticalSectionRawMutex, N>,
    connected: AtomicBool,
}

impl<const N: usize> Default for UsbPipes<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> UsbPipes<N> {
    pub const fn new() -> Self {
        Self {
            rx: Pipe::new(),
            tx: Pipe::new(),
            connected: AtomicBool::new(false),
        }
    }

    /// Whether a host has the port open
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

/// Poll-side end of the USB serial link
pub struct UsbSerialTransport<'p, const N: usize> {
    pipes: &'p UsbPipes<N>,
}

impl<'p, const N: usize> UsbSerialTransport<'p, N> {
    pub fn new(pipes: &'p UsbPipes<N>) -> Self {
        Self { pipes }
    }
}

impl<const N: usize> ByteTransport for UsbSerialTransport<'_, N> {
    type Error = TransportError;

    fn try_read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.pipes.rx.try_read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        if !self.pipes.is_connected() {
            return Err(TransportError::Disconnected);
        }
        retry_write(USB_WRITE_SPIN_LIMIT, || {
            matches!(self.pipes.tx.try_write(&[byte]), Ok(1))
        })
    }
}

/// Shuttle bytes between the CDC class and the pipes, forever
///
/// Waits for the host to open the port, then runs both directions until the
/// endpoint goes away, and starts over.
pub async fn run_cdc_bridge<'d, D: Driver<'d>, const N: usize>(
    class: CdcAcmClass<'d, D>,
    pipes: &UsbPipes<N>,
) -> ! {
    let (mut sender, mut receiver) = class.split();
    loop {
        receiver.wait_connection().await;
        pipes.connected.store(true, Ordering::Release);
        #[cfg(feature = "defmt")]
        defmt::info!("USB host connected");

        select(host_to_pipe(&mut receiver, pipes), pipe_to_host(&mut sender, pipes)).await;

        pipes.connected.store(false, Ordering::Release);
        #[cfg(feature = "defmt")]
        defmt::info!("USB host disconnected");
    }
}

async fn host_to_pipe<'d, D: Driver<'d>, const N: usize>(
    receiver: &mut Receiver<'d, D>,
    pipes: &UsbPipes<N>,
) -> EndpointError {
    let mut packet = [0u8; MAX_PACKET_SIZE];
    loop {
        match receiver.read_packet(&mut packet).await {
            Ok(n) => pipes.rx.write_all(&packet[..n]).await,
            Err(e) => return e,
        }
    }
}

async fn pipe_to_host<'d, D: Driver<'d>, const N: usize>(
    sender: &mut Sender<'d, D>,
    pipes: &UsbPipes<N>,
) -> EndpointError {
    let mut packet = [0u8; MAX_PACKET_SIZE];
    loop {
        let n = pipes.tx.read(&mut packet).await;
        if let Err(e) = sender.write_packet(&packet[..n]).await {
            return e;
        }
        // A full packet leaves the host waiting for more; terminate the transfer
        if n == MAX_PACKET_SIZE {
            if let Err(e) = sender.write_packet(&[]).await {
                return e;
            }
        }
    }
}
