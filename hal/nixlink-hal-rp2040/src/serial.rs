//! UART transport
//!
//! Receive path: the UART interrupt fills embassy's buffered ring, and
//! [`pump_rx`] (run on a higher-priority executor) moves each byte into the
//! link's SPSC [`RxConsumer`]/[`RxProducer`] queue. The poll loop reads the
//! consumer half without ever blocking.
//!
//! Transmit path: the poll loop drops bytes into a [`SerialTxPipe`] with a
//! bounded retry, and [`pump_tx`] drains the pipe into the UART.

use embassy_rp::uart;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;
use embedded_io_async::{Read, Write};
use nixlink_hal::transport::{DataBits, Parity, StopBits};
use nixlink_hal::{retry_write, ByteTransport, TransportError, UartConfig};
use nixlink_protocol::{RxConsumer, RxProducer};

/// Bytes pulled from the UART ring per read
const PUMP_CHUNK: usize = 32;

/// Attempts at queueing one outbound byte before giving up
pub const UART_WRITE_SPIN_LIMIT: u32 = 100_000;

/// Outbound bytes between the poll loop and [`pump_tx`]
pub type SerialTxPipe<const N: usize> = Pipe<CriticalSectionRawMutex, N>;

/// Map the link's line settings onto the embassy UART config
pub fn to_uart_config(config: &UartConfig) -> uart::Config {
    let mut out = uart::Config::default();
    out.baudrate = config.baudrate;
    out.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    out.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    out.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    out
}

/// Serial transport over the receive queue and the transmit pipe
pub struct BufferedSerialTransport<'q, const N: usize, const TX: usize> {
    rx: RxConsumer<'q, N>,
    tx: &'q SerialTxPipe<TX>,
}

impl<'q, const N: usize, const TX: usize> BufferedSerialTransport<'q, N, TX> {
    pub fn new(rx: RxConsumer<'q, N>, tx: &'q SerialTxPipe<TX>) -> Self {
        Self { rx, tx }
    }

    /// Bytes lost to queue overflow since the last call
    pub fn take_dropped(&self) -> u32 {
        self.rx.take_dropped()
    }
}

impl<const N: usize, const TX: usize> ByteTransport for BufferedSerialTransport<'_, N, TX> {
    type Error = TransportError;

    fn try_read_byte(&mut self) -> Option<u8> {
        self.rx.pop()
    }

    /// Times out if the UART has not drained the pipe within
    /// [`UART_WRITE_SPIN_LIMIT`] attempts
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        retry_write(UART_WRITE_SPIN_LIMIT, || {
            matches!(self.tx.try_write(&[byte]), Ok(1))
        })
    }
}

/// Move received bytes from the UART into the receive queue, forever
///
/// Bytes that do not fit are dropped by the queue and counted there.
pub async fn pump_rx<R: Read, const N: usize>(rx: &mut R, queue: &mut RxProducer<'_, N>) -> ! {
    let mut buf = [0u8; PUMP_CHUNK];
    loop {
        match rx.read(&mut buf).await {
            Ok(n) => {
                for &byte in &buf[..n] {
                    // Overflow is counted by the queue
                    let _ = queue.push(byte);
                }
            }
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("UART read error: {:?}", defmt::Debug2Format(&_e));
            }
        }
    }
}

/// Move queued outbound bytes from the transmit pipe into the UART, forever
pub async fn pump_tx<W: Write, const N: usize>(tx: &mut W, pipe: &SerialTxPipe<N>) -> ! {
    let mut buf = [0u8; PUMP_CHUNK];
    loop {
        let n = pipe.read(&mut buf).await;
        if let Err(_e) = tx.write_all(&buf[..n]).await {
            #[cfg(feature = "defmt")]
            defmt::warn!("UART write error: {:?}", defmt::Debug2Format(&_e));
        }
    }
}
