//! Upload error types.

use std::io;

use thiserror::Error;

use crate::protocol::UploadPhase;

/// Upload failure. Cancellation is not an error; see
/// [`crate::UploadOutcome`].
#[derive(Debug, Error)]
pub enum UploadError {
    /// The serial port could not be opened or configured.
    #[error("failed to open serial port: {0}")]
    Port(#[from] serialport::Error),

    /// Read or write failure on an open connection.
    #[error("serial connection error: {0}")]
    Connection(#[from] io::Error),

    /// The controller answered something other than the ready byte.
    /// Definitive failure, not retried.
    #[error("controller answered 0x{byte:02X} while {phase}")]
    UnexpectedByte { phase: UploadPhase, byte: u8 },
}
