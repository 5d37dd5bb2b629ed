//! Byte transport abstractions
//!
//! The link core only ever moves single bytes: a non-blocking read that
//! returns whatever is pending, and a write that waits (boundedly) until the
//! hardware accepts the byte.

/// Byte-oriented transport
///
/// Exactly one implementation is active at a time. Implementations that are
/// fed from an interrupt (buffered UART) and implementations that read
/// synchronously from a class driver (USB CDC) look the same from here.
pub trait ByteTransport {
    /// Error type for write operations
    type Error;

    /// Take the next pending byte, if any
    ///
    /// Never blocks.
    fn try_read_byte(&mut self) -> Option<u8>;

    /// Write one byte
    ///
    /// Busy-waits until the transport accepts the byte. Implementations must
    /// bound the wait and report [`TransportError::Timeout`] (or their own
    /// equivalent) instead of spinning forever.
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Write a slice, stopping at the first error
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for &byte in data {
            self.write_byte(byte)?;
        }
        Ok(())
    }
}

impl<T: ByteTransport + ?Sized> ByteTransport for &mut T {
    type Error = T::Error;

    fn try_read_byte(&mut self) -> Option<u8> {
        (**self).try_read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        (**self).write_byte(byte)
    }
}

/// Errors shared by the bundled transports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The transport did not accept the byte within its wait bound
    Timeout,
    /// The link is down (e.g. USB host not connected)
    Disconnected,
}

/// Retry a non-blocking write until it is accepted or `attempts` run out
///
/// `try_write` reports whether the byte was taken. Gives up with
/// [`TransportError::Timeout`], so a stalled sink cannot hang the caller.
pub fn retry_write(
    attempts: u32,
    mut try_write: impl FnMut() -> bool,
) -> Result<(), TransportError> {
    for _ in 0..attempts {
        if try_write() {
            return Ok(());
        }
    }
    Err(TransportError::Timeout)
}

/// Which transport to bring up at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportKind {
    /// Interrupt-buffered asynchronous serial
    #[default]
    Serial,
    /// Serial over USB (CDC-ACM)
    UsbSerial,
}

impl TransportKind {
    /// Parse a config value ("serial" / "usb")
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "serial" | "uart" => Some(TransportKind::Serial),
            "usb" | "usb-serial" | "usb_serial" => Some(TransportKind::UsbSerial),
            _ => None,
        }
    }
}

/// The transport chosen at startup
///
/// Lets the poll loop be monomorphised once while still selecting the
/// concrete transport from configuration at runtime.
pub enum SelectedTransport<S, U> {
    Serial(S),
    UsbSerial(U),
}

impl<S, U> SelectedTransport<S, U> {
    /// Kind of the active transport
    pub fn kind(&self) -> TransportKind {
        match self {
            SelectedTransport::Serial(_) => TransportKind::Serial,
            SelectedTransport::UsbSerial(_) => TransportKind::UsbSerial,
        }
    }
}

impl<S, U> ByteTransport for SelectedTransport<S, U>
where
    S: ByteTransport,
    U: ByteTransport<Error = S::Error>,
{
    type Error = S::Error;

    fn try_read_byte(&mut self) -> Option<u8> {
        match self {
            SelectedTransport::Serial(s) => s.try_read_byte(),
            SelectedTransport::UsbSerial(u) => u.try_read_byte(),
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        match self {
            SelectedTransport::Serial(s) => s.write_byte(byte),
            SelectedTransport::UsbSerial(u) => u.write_byte(byte),
        }
    }
}

/// UART line configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Loopback {
        pending: Option<u8>,
        written: [u8; 4],
        count: usize,
    }

    impl ByteTransport for Loopback {
        type Error = TransportError;

        fn try_read_byte(&mut self) -> Option<u8> {
            self.pending.take()
        }

        fn write_byte(&mut self, byte: u8) -> Result<(), TransportError> {
            if self.count == self.written.len() {
                return Err(TransportError::Timeout);
            }
            self.written[self.count] = byte;
            self.count += 1;
            Ok(())
        }
    }

    #[test]
    fn test_retry_write_succeeds_once_space_frees() {
        let mut tries = 0;
        let result = retry_write(10, || {
            tries += 1;
            tries == 3
        });
        assert_eq!(result, Ok(()));
        assert_eq!(tries, 3);
    }

    #[test]
    fn test_retry_write_times_out_on_stalled_sink() {
        let mut tries = 0;
        let result = retry_write(500, || {
            tries += 1;
            false
        });
        assert_eq!(result, Err(TransportError::Timeout));
        assert_eq!(tries, 500);
    }

    #[test]
    fn test_retry_write_zero_attempts() {
        assert_eq!(retry_write(0, || true), Err(TransportError::Timeout));
    }

    fn loopback(pending: Option<u8>) -> Loopback {
        Loopback {
            pending,
            written: [0; 4],
            count: 0,
        }
    }

    #[test]
    fn test_selected_transport_dispatches_to_active_variant() {
        let mut t: SelectedTransport<Loopback, Loopback> =
            SelectedTransport::UsbSerial(loopback(Some(0x42)));
        assert_eq!(t.kind(), TransportKind::UsbSerial);
        assert_eq!(t.try_read_byte(), Some(0x42));
        assert_eq!(t.try_read_byte(), None);

        t.write_byte(7).unwrap();
        match t {
            SelectedTransport::UsbSerial(u) => assert_eq!(&u.written[..u.count], &[7]),
            SelectedTransport::Serial(_) => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_write_all_stops_at_first_error() {
        let mut t = loopback(None);
        assert_eq!(
            t.write_all(&[1, 2, 3, 4, 5]),
            Err(TransportError::Timeout)
        );
        assert_eq!(t.written, [1, 2, 3, 4]);
    }

    #[test]
    fn test_transport_kind_from_name() {
        assert_eq!(TransportKind::from_name("serial"), Some(TransportKind::Serial));
        assert_eq!(TransportKind::from_name("usb"), Some(TransportKind::UsbSerial));
        assert_eq!(TransportKind::from_name("spi"), None);
        assert_eq!(TransportKind::default(), TransportKind::Serial);
    }

    #[test]
    fn test_default_line_is_115200_8n1() {
        let cfg = UartConfig::default();
        assert_eq!(cfg.baudrate, 115200);
        assert_eq!(cfg.data_bits, DataBits::Eight);
        assert_eq!(cfg.parity, Parity::None);
        assert_eq!(cfg.stop_bits, StopBits::One);
    }
}
