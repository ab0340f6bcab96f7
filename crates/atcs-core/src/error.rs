//! Error types for atcs.
//!
//! All fallible operations across the workspace return [`Result<T>`], which
//! uses [`Error`] as the error type. Link, framing, and mount-level failures
//! share one enum so a host only has to match in one place.

/// The error type for all atcs operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The mount is not connected; no bytes were exchanged.
    #[error("not connected")]
    NotConnected,

    /// The serial port could not be opened.
    #[error("communication link error: {0}")]
    CommLink(String),

    /// The port opened but the controller never answered the handshake.
    #[error("no link to the controller")]
    NoLink,

    /// The controller replied with NACK.
    #[error("controller rejected the command (NACK)")]
    BadResponse,

    /// No reply arrived within the command timeout.
    ///
    /// Usually the controller is powered off or the cable is loose.
    #[error("timeout waiting for response")]
    Timeout,

    /// A reply grew past the frame limit without a terminator.
    #[error("receive buffer overflow ({0} bytes without terminator)")]
    BufferOverflow(usize),

    /// A reply could not be decoded (angle text, integer, yes/no).
    #[error("parse error: {0}")]
    Parse(String),

    /// A compound operation stopped on a failed step.
    #[error("command failed: {0}")]
    CommandFailed(String),

    /// A transport-level error below framing (write, flush, mock mismatch).
    #[error("transport error: {0}")]
    Transport(String),

    /// An invalid parameter was passed to a mount operation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The connection dropped while a command was in flight.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error means the physical link is gone and the host
    /// should disconnect rather than retry.
    pub fn is_link_failure(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::ConnectionLost | Error::Io(_) | Error::CommLink(_)
        )
    }
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_comm_link() {
        let e = Error::CommLink("/dev/ttyUSB0: no such file".into());
        assert_eq!(
            e.to_string(),
            "communication link error: /dev/ttyUSB0: no such file"
        );
    }

    #[test]
    fn error_display_no_link() {
        assert_eq!(Error::NoLink.to_string(), "no link to the controller");
    }

    #[test]
    fn error_display_bad_response() {
        assert_eq!(
            Error::BadResponse.to_string(),
            "controller rejected the command (NACK)"
        );
    }

    #[test]
    fn error_display_timeout() {
        assert_eq!(Error::Timeout.to_string(), "timeout waiting for response");
    }

    #[test]
    fn error_display_overflow() {
        let e = Error::BufferOverflow(257);
        assert_eq!(
            e.to_string(),
            "receive buffer overflow (257 bytes without terminator)"
        );
    }

    #[test]
    fn error_display_parse() {
        let e = Error::Parse("expected 3 fields in \"12:30\"".into());
        assert!(e.to_string().starts_with("parse error: "));
    }

    #[test]
    fn error_display_not_connected() {
        assert_eq!(Error::NotConnected.to_string(), "not connected");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("pipe broken"));
    }

    #[test]
    fn link_failures() {
        assert!(Error::ConnectionLost.is_link_failure());
        assert!(Error::Transport("write".into()).is_link_failure());
        assert!(!Error::Timeout.is_link_failure());
        assert!(!Error::BadResponse.is_link_failure());
        assert!(!Error::Parse("x".into()).is_link_failure());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn result_alias_works() {
        let ok: Result<u32> = Ok(42);
        assert!(matches!(ok, Ok(42)));

        let err: Result<u32> = Err(Error::Timeout);
        assert!(err.is_err());
    }
}
