//! Poll/acknowledge upload state machine.

use std::fmt;

use tracing::{debug, info};

use crate::error::UploadError;
use crate::link::SerialLink;

/// Byte the host repeats until the controller is ready.
pub const POLL_BYTE: u8 = b'8';

/// Byte the controller answers when ready, and again after the frame.
pub const READY_BYTE: u8 = b'U';

/// Where the handshake currently is; handed to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    AwaitingReady,
    Transmitting,
    AwaitingAck,
}

impl fmt::Display for UploadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UploadPhase::AwaitingReady => "awaiting controller ready",
            UploadPhase::Transmitting => "transmitting frame",
            UploadPhase::AwaitingAck => "awaiting acknowledge",
        })
    }
}

/// How an upload ended when nothing went wrong at the transport or
/// protocol level. Cancellation is a first-class outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum UploadOutcome {
    Completed,
    Cancelled,
}

/// Drive the poll/acknowledge handshake over `link` and send `frame`.
///
/// The callback runs exactly once per timed-out read, with the current
/// phase; returning `false` stops the upload immediately with
/// [`UploadOutcome::Cancelled`] and no further I/O. There is no hard
/// iteration cap: a silent controller is exited via the callback.
///
/// # Errors
///
/// Transport failures surface as connection errors; a byte other than
/// [`READY_BYTE`] is a definitive protocol failure carrying the offending
/// byte.
pub fn upload<L, F>(
    link: &mut L,
    frame: &[u8],
    mut progress: F,
) -> Result<UploadOutcome, UploadError>
where
    L: SerialLink + ?Sized,
    F: FnMut(UploadPhase) -> bool,
{
    debug!(len = frame.len(), "starting controller upload");

    // Poll until the controller reports ready.
    loop {
        link.write_all(&[POLL_BYTE])?;
        match link.read_byte()? {
            Some(READY_BYTE) => break,
            Some(byte) => {
                return Err(UploadError::UnexpectedByte {
                    phase: UploadPhase::AwaitingReady,
                    byte,
                });
            }
            None => {
                if !progress(UploadPhase::AwaitingReady) {
                    debug!("upload cancelled while polling for ready");
                    return Ok(UploadOutcome::Cancelled);
                }
            }
        }
    }

    // One contiguous write; the controller expects the frame in a single
    // piece after it signals ready.
    link.write_all(frame)?;
    debug!(len = frame.len(), "frame written, awaiting acknowledge");

    loop {
        match link.read_byte()? {
            Some(READY_BYTE) => {
                info!("controller acknowledged upload");
                return Ok(UploadOutcome::Completed);
            }
            Some(byte) => {
                return Err(UploadError::UnexpectedByte {
                    phase: UploadPhase::AwaitingAck,
                    byte,
                });
            }
            None => {
                if !progress(UploadPhase::AwaitingAck) {
                    debug!("upload cancelled while awaiting acknowledge");
                    return Ok(UploadOutcome::Cancelled);
                }
            }
        }
    }
}

/// Open `port_name`, run [`upload`], and release the port on every exit
/// path (the connection is scoped to this call).
///
/// # Errors
///
/// Port open failures and everything [`upload`] can fail with.
pub fn upload_to_port<F>(
    port_name: &str,
    frame: &[u8],
    progress: F,
) -> Result<UploadOutcome, UploadError>
where
    F: FnMut(UploadPhase) -> bool,
{
    let mut link = crate::link::SerialPortLink::open(port_name)?;
    upload(&mut link, frame, progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    enum ReadStep {
        Byte(u8),
        Timeout,
        Fail(io::ErrorKind),
    }

    /// Scripted peer: answers reads from a fixed script and records every
    /// write.
    struct ScriptedLink {
        reads: VecDeque<ReadStep>,
        writes: Vec<Vec<u8>>,
    }

    impl ScriptedLink {
        fn new(reads: Vec<ReadStep>) -> Self {
            Self {
                reads: reads.into(),
                writes: Vec::new(),
            }
        }
    }

    impl SerialLink for ScriptedLink {
        fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
            self.writes.push(bytes.to_vec());
            Ok(())
        }

        fn read_byte(&mut self) -> io::Result<Option<u8>> {
            match self.reads.pop_front() {
                Some(ReadStep::Byte(b)) => Ok(Some(b)),
                Some(ReadStep::Timeout) | None => Ok(None),
                Some(ReadStep::Fail(kind)) => Err(io::Error::new(kind, "scripted failure")),
            }
        }
    }

    const FRAME: [u8; 5] = [0x0F, 0x1F, 0x03, 0x3C, 0x2B];

    #[test]
    fn test_upload_succeeds_when_peer_acknowledges() {
        let mut link = ScriptedLink::new(vec![
            ReadStep::Byte(READY_BYTE),
            ReadStep::Byte(READY_BYTE),
        ]);
        let mut pulses = 0;
        let outcome = upload(&mut link, &FRAME, |_| {
            pulses += 1;
            true
        })
        .expect("upload should succeed");

        assert_eq!(outcome, UploadOutcome::Completed);
        assert_eq!(pulses, 0);
        assert_eq!(link.writes, vec![vec![POLL_BYTE], FRAME.to_vec()]);
    }

    #[test]
    fn test_upload_polls_through_timeouts_before_ready() {
        let mut link = ScriptedLink::new(vec![
            ReadStep::Timeout,
            ReadStep::Timeout,
            ReadStep::Byte(READY_BYTE),
            ReadStep::Byte(READY_BYTE),
        ]);
        let mut pulses = 0;
        let outcome = upload(&mut link, &FRAME, |phase| {
            assert_eq!(phase, UploadPhase::AwaitingReady);
            pulses += 1;
            true
        })
        .expect("upload should succeed");

        assert_eq!(outcome, UploadOutcome::Completed);
        assert_eq!(pulses, 2);
        // Three polls (two unanswered), then the frame.
        assert_eq!(link.writes.len(), 4);
        assert_eq!(link.writes[3], FRAME.to_vec());
    }

    #[test]
    fn test_cancellation_on_third_pulse_stops_all_io() {
        let mut link = ScriptedLink::new(vec![]);
        let mut pulses = 0;
        let outcome = upload(&mut link, &FRAME, |_| {
            pulses += 1;
            pulses < 3
        })
        .expect("cancellation is not an error");

        assert_eq!(outcome, UploadOutcome::Cancelled);
        assert_eq!(pulses, 3);
        // Exactly the three unanswered polls, none of the payload.
        assert_eq!(link.writes, vec![vec![POLL_BYTE]; 3]);
    }

    #[test]
    fn test_unexpected_byte_while_awaiting_ready_fails() {
        let mut link = ScriptedLink::new(vec![ReadStep::Byte(0x41)]);
        let err = upload(&mut link, &FRAME, |_| true).expect_err("0x41 is not ready");

        assert!(matches!(
            err,
            UploadError::UnexpectedByte {
                phase: UploadPhase::AwaitingReady,
                byte: 0x41,
            }
        ));
        // Zero payload bytes written.
        assert_eq!(link.writes, vec![vec![POLL_BYTE]]);
    }

    #[test]
    fn test_unexpected_byte_after_frame_fails() {
        let mut link = ScriptedLink::new(vec![
            ReadStep::Byte(READY_BYTE),
            ReadStep::Byte(0x00),
        ]);
        let err = upload(&mut link, &FRAME, |_| true).expect_err("0x00 is not an ack");

        assert!(matches!(
            err,
            UploadError::UnexpectedByte {
                phase: UploadPhase::AwaitingAck,
                byte: 0x00,
            }
        ));
        assert_eq!(link.writes, vec![vec![POLL_BYTE], FRAME.to_vec()]);
    }

    #[test]
    fn test_cancellation_while_awaiting_ack() {
        let mut link = ScriptedLink::new(vec![ReadStep::Byte(READY_BYTE)]);
        let outcome = upload(&mut link, &FRAME, |phase| phase != UploadPhase::AwaitingAck)
            .expect("cancellation is not an error");

        assert_eq!(outcome, UploadOutcome::Cancelled);
        // The frame went out before the cancel; nothing after it.
        assert_eq!(link.writes, vec![vec![POLL_BYTE], FRAME.to_vec()]);
    }

    #[test]
    fn test_connection_error_propagates() {
        let mut link = ScriptedLink::new(vec![ReadStep::Fail(io::ErrorKind::BrokenPipe)]);
        let err = upload(&mut link, &FRAME, |_| true).expect_err("broken pipe must fail");
        assert!(matches!(err, UploadError::Connection(_)));
    }

    #[test]
    fn test_works_through_trait_object() {
        let mut link = ScriptedLink::new(vec![
            ReadStep::Byte(READY_BYTE),
            ReadStep::Byte(READY_BYTE),
        ]);
        let dyn_link: &mut dyn SerialLink = &mut link;
        let outcome = upload(dyn_link, &FRAME, |_| true).expect("upload should succeed");
        assert_eq!(outcome, UploadOutcome::Completed);
    }
}
