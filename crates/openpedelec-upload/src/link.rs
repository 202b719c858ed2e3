//! Serial transport seam.

use std::io::{self, Read, Write};
use std::time::Duration;

use tracing::debug;

use crate::error::UploadError;

/// Wire settings of the controller's programming port.
pub const BAUD_RATE: u32 = 9600;

/// Per-read timeout; each expiry is a cancellation checkpoint.
pub const READ_TIMEOUT: Duration = Duration::from_millis(200);

/// Byte-level serial connection as the handshake needs it.
///
/// Implementations own the connection exclusively for the duration of one
/// upload and release it when dropped.
pub trait SerialLink {
    /// Write the whole buffer.
    ///
    /// # Errors
    ///
    /// Any transport failure; the upload maps it to a connection error.
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Read a single byte, returning `Ok(None)` when the read times out.
    ///
    /// # Errors
    ///
    /// Any transport failure other than a timeout.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// [`SerialLink`] over a real serial port (9600-8-N-1, 200 ms reads).
pub struct SerialPortLink {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialPortLink {
    /// Open and configure `port_name`.
    ///
    /// # Errors
    ///
    /// Propagates the underlying open/configure failure.
    pub fn open(port_name: &str) -> Result<Self, UploadError> {
        let port = serialport::new(port_name, BAUD_RATE)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(READ_TIMEOUT)
            .open()?;
        debug!(port = port_name, baud = BAUD_RATE, "opened serial port");
        Ok(Self { port })
    }
}

impl SerialLink for SerialPortLink {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }
}
