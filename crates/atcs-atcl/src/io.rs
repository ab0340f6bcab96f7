//! Command/response exchange over an owned transport.
//!
//! The [`Framer`] sends one command, then reads frames until the reply to
//! that command turns up. Async notices that arrive first are logged and
//! skipped. There is never more than one command in flight: every call
//! takes `&mut self`.

use std::time::Duration;

use tracing::{debug, info, trace, warn};

use atcs_core::error::{Error, Result};
use atcs_core::transport::Transport;

use crate::protocol::{self, DecodeResult, Frame, NoticeKind};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Configuration for the framer.
#[derive(Debug, Clone)]
pub struct FramerConfig {
    /// How long to wait for each frame of a reply.
    pub command_timeout: Duration,
    /// Largest frame accepted before giving up with
    /// [`Error::BufferOverflow`].
    pub max_frame: usize,
}

impl Default for FramerConfig {
    fn default() -> Self {
        FramerConfig {
            command_timeout: Duration::from_secs(1),
            max_frame: protocol::MAX_FRAME,
        }
    }
}

/// A successful reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ack,
    Payload(String),
    /// The controller did not understand the command. Returned rather than
    /// raised; callers decide whether that matters.
    SyntaxError(String),
}

impl Reply {
    /// Reply text; empty for an ACK.
    pub fn text(&self) -> &str {
        match self {
            Reply::Ack => "",
            Reply::Payload(s) | Reply::SyntaxError(s) => s,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Reply::Ack => String::new(),
            Reply::Payload(s) | Reply::SyntaxError(s) => s,
        }
    }
}

/// Owns the transport and runs ATCL exchanges.
pub struct Framer {
    transport: Box<dyn Transport>,
    config: FramerConfig,
    /// Bytes received but not yet framed. Survives between exchanges.
    rx_buf: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Exchange
// ---------------------------------------------------------------------------

impl Framer {
    pub fn new(transport: Box<dyn Transport>, config: FramerConfig) -> Self {
        Framer {
            transport,
            config,
            rx_buf: Vec::new(),
        }
    }

    pub fn config(&self) -> &FramerConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Send `cmd` and return the controller's reply.
    ///
    /// NACK maps to [`Error::BadResponse`]; a silent line to
    /// [`Error::Timeout`]. Write failures come straight from the transport
    /// and are not retried.
    pub async fn execute(&mut self, cmd: &[u8]) -> Result<Reply> {
        debug!(command = %protocol::describe(cmd), "ATCL send");
        self.transport.send(cmd).await?;

        loop {
            match self.read_frame().await? {
                Frame::Ack => {
                    debug!("ATCL ack");
                    return Ok(Reply::Ack);
                }
                Frame::Nack => {
                    debug!(command = %protocol::describe(cmd), "ATCL nack");
                    return Err(Error::BadResponse);
                }
                Frame::Notice { kind, text } => {
                    log_notice(kind, &text);
                }
                Frame::SyntaxError(text) => {
                    warn!(
                        command = %protocol::describe(cmd),
                        message = %text,
                        "controller reported a syntax error"
                    );
                    return Ok(Reply::SyntaxError(text));
                }
                Frame::Payload(text) => {
                    debug!(reply = %text, "ATCL reply");
                    return Ok(Reply::Payload(text));
                }
            }
        }
    }

    /// Read one frame. A failed read drops whatever part of the reply had
    /// arrived so it cannot prefix the next exchange.
    async fn read_frame(&mut self) -> Result<Frame> {
        let result = self.fill_frame().await;
        if result.is_err() && !self.rx_buf.is_empty() {
            debug!(
                bytes = %protocol::describe(&self.rx_buf),
                "discarding partial reply"
            );
            self.rx_buf.clear();
        }
        result
    }

    /// Read until one complete frame is buffered, bounded by the command
    /// timeout.
    async fn fill_frame(&mut self) -> Result<Frame> {
        let deadline = tokio::time::Instant::now() + self.config.command_timeout;
        let mut recv_buf = [0u8; 256];

        loop {
            match protocol::decode_frame(&self.rx_buf, self.config.max_frame) {
                DecodeResult::Frame { frame, consumed } => {
                    self.rx_buf.drain(..consumed);
                    return Ok(frame);
                }
                DecodeResult::Overflow(len) => {
                    warn!(len, "receive buffer overflow, clearing");
                    self.rx_buf.clear();
                    return Err(Error::BufferOverflow(len));
                }
                DecodeResult::Incomplete => {}
            }

            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Err(Error::Timeout);
            }

            match self.transport.receive(&mut recv_buf, deadline - now).await {
                Ok(0) => return Err(Error::Timeout),
                Ok(n) => {
                    trace!(bytes = %protocol::describe(&recv_buf[..n]), "ATCL recv");
                    self.rx_buf.extend_from_slice(&recv_buf[..n]);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Drop buffered input, purge the port, and close it.
    pub async fn close(&mut self) -> Result<()> {
        self.rx_buf.clear();
        if let Err(e) = self.transport.purge().await {
            warn!(error = %e, "purge before close failed (continuing anyway)");
        }
        self.transport.close().await
    }
}

fn log_notice(kind: NoticeKind, text: &str) {
    match kind {
        NoticeKind::Status | NoticeKind::Idle => {
            info!(?kind, message = %text, "controller notice");
        }
        NoticeKind::Warning | NoticeKind::Alert | NoticeKind::InternalError => {
            warn!(?kind, message = %text, "controller notice");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ACK, ASYNC_ALERT, ASYNC_STATUS, NACK, SYNTAX_ERROR};
    use atcs_test_harness::MockTransport;

    fn framer(mock: MockTransport) -> Framer {
        Framer::new(Box::new(mock), FramerConfig::default())
    }

    #[tokio::test]
    async fn ack_reply() {
        let mut mock = MockTransport::new();
        mock.expect(b"!QDcn;", &[ACK]);
        let mut f = framer(mock);
        assert_eq!(f.execute(b"!QDcn;").await.unwrap(), Reply::Ack);
    }

    #[tokio::test]
    async fn payload_reply() {
        let mut mock = MockTransport::new();
        mock.expect(b"!CGra;", b"05:34:31.9;");
        let mut f = framer(mock);
        let reply = f.execute(b"!CGra;").await.unwrap();
        assert_eq!(reply.text(), "05:34:31.9");
    }

    #[tokio::test]
    async fn async_notice_is_skipped() {
        let mut response = vec![ASYNC_STATUS];
        response.extend_from_slice(b"ignore;35%;");
        let mut mock = MockTransport::new();
        mock.expect(b"!GGgr;", &response);

        let mut f = framer(mock);
        let reply = f.execute(b"!GGgr;").await.unwrap();
        assert_eq!(reply, Reply::Payload("35".into()));
    }

    #[tokio::test]
    async fn several_notices_before_ack() {
        let mut response = vec![ASYNC_ALERT];
        response.extend_from_slice(b"Limit;");
        response.push(ASYNC_STATUS);
        response.extend_from_slice(b"Slewing;");
        response.push(ACK);
        let mut mock = MockTransport::new();
        mock.expect(b"!GTrn;", &response);

        let mut f = framer(mock);
        assert_eq!(f.execute(b"!GTrn;").await.unwrap(), Reply::Ack);
    }

    #[tokio::test]
    async fn nack_is_bad_response() {
        let mut mock = MockTransport::new();
        mock.expect(b"!ACrn;", &[NACK]);
        let mut f = framer(mock);
        let err = f.execute(b"!ACrn;").await.unwrap_err();
        assert!(matches!(err, Error::BadResponse));
    }

    #[tokio::test]
    async fn syntax_error_is_surfaced_as_reply() {
        let mut response = vec![SYNTAX_ERROR];
        response.extend_from_slice(b"Bad opcode;");
        let mut mock = MockTransport::new();
        mock.expect(b"!ZZzz;", &response);

        let mut f = framer(mock);
        let reply = f.execute(b"!ZZzz;").await.unwrap();
        assert_eq!(reply, Reply::SyntaxError("Bad opcode".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_line_times_out() {
        let mut f = framer(MockTransport::unresponsive());
        let start = tokio::time::Instant::now();
        let err = f.execute(b"!AGak;").await.unwrap_err();
        assert!(matches!(err, Error::Timeout));
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn truncated_payload_times_out() {
        let mut mock = MockTransport::new();
        mock.expect(b"!CGde;", b"+45:00");
        let mut f = framer(mock);
        let err = f.execute(b"!CGde;").await.unwrap_err();
        assert!(matches!(err, Error::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn truncated_payload_does_not_leak_into_next_reply() {
        let mut mock = MockTransport::new();
        mock.expect(b"!CGde;", b"+45:00");
        mock.expect_reply(b"!AGak;", "No");
        let mut f = framer(mock);

        let err = f.execute(b"!CGde;").await.unwrap_err();
        assert!(matches!(err, Error::Timeout));
        assert_eq!(
            f.execute(b"!AGak;").await.unwrap(),
            Reply::Payload("No".into())
        );
    }

    #[tokio::test]
    async fn overflow_without_terminator() {
        let mut mock = MockTransport::new();
        mock.expect(b"!HGsm;", &[b'A'; 300]);
        let mut f = framer(mock);
        let err = f.execute(b"!HGsm;").await.unwrap_err();
        assert!(matches!(err, Error::BufferOverflow(300)));
    }

    #[tokio::test]
    async fn leftover_bytes_feed_next_exchange() {
        let mut mock = MockTransport::new();
        mock.expect(b"!ACst;", b"Yes;24hr;");
        mock.expect(b"!TGlf;", b"");
        let mut f = framer(mock);

        assert_eq!(f.execute(b"!ACst;").await.unwrap().text(), "Yes");
        assert_eq!(f.execute(b"!TGlf;").await.unwrap().text(), "24hr");
    }

    #[tokio::test]
    async fn write_failure_propagates() {
        let mut mock = MockTransport::new();
        mock.set_connected(false);
        let mut f = framer(mock);
        let err = f.execute(b"!AGak;").await.unwrap_err();
        assert!(matches!(err, Error::NotConnected));
    }

    #[tokio::test]
    async fn close_purges_then_closes() {
        let mut f = framer(MockTransport::new());
        assert!(f.is_connected());
        f.close().await.unwrap();
        assert!(!f.is_connected());
    }
}
