//! Serial upload handshake for EB3-series controllers.
//!
//! The controller's programming port speaks a minimal poll/acknowledge
//! protocol at 9600-8-N-1: the host repeats a poll byte until the
//! controller answers ready, writes the parameter frame in one piece, and
//! waits for the same acknowledge byte again. Every read timeout is a
//! suspension point where a caller-supplied callback is consulted; a
//! `false` return cancels the upload with no further I/O.
//!
//! Protocol logic is written against the [`SerialLink`] seam so it can be
//! exercised without hardware; [`SerialPortLink`] is the real transport.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(static_mut_refs)]

pub mod error;
pub mod link;
pub mod protocol;

pub use error::UploadError;
pub use link::{BAUD_RATE, READ_TIMEOUT, SerialLink, SerialPortLink};
pub use protocol::{
    POLL_BYTE, READY_BYTE, UploadOutcome, UploadPhase, upload, upload_to_port,
};
