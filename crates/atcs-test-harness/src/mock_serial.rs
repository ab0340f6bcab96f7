//! Mock transport for deterministic testing of the ATCL framer and mount.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs, so command encoding, reply classification, and
//! mount sequencing can be tested without a controller.
//!
//! # Example
//!
//! ```
//! use atcs_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // When the framer sends `!AGak;`, the controller answers `No;`.
//! mock.expect(b"!AGak;", b"No;");
//! // ENTER is acknowledged with a bare ACK byte.
//! mock.expect(&[0xB1], &[0x8F]);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use atcs_core::error::{Error, Result};
use atcs_core::transport::Transport;

/// A pre-loaded request/response pair for the mock transport.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be sent.
    request: Vec<u8>,
    /// The bytes to return once the request arrives. Empty means silence.
    response: Vec<u8>,
}

/// Shared handle onto everything sent through a [`MockTransport`].
///
/// The mock is usually moved into a `Box<dyn Transport>` owned by the code
/// under test; grab this handle first to inspect the traffic afterwards.
#[derive(Debug, Clone, Default)]
pub struct SentLog(Arc<Mutex<Vec<Vec<u8>>>>);

impl SentLog {
    fn push(&self, data: &[u8]) {
        if let Ok(mut log) = self.0.lock() {
            log.push(data.to_vec());
        }
    }

    /// Every `send()` payload, oldest first.
    pub fn entries(&self) -> Vec<Vec<u8>> {
        self.0.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Every `send()` payload rendered lossily as text.
    pub fn as_strings(&self) -> Vec<String> {
        self.entries()
            .iter()
            .map(|e| String::from_utf8_lossy(e).into_owned())
            .collect()
    }

    /// Number of `send()` calls seen.
    pub fn len(&self) -> usize {
        self.0.lock().map(|log| log.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A mock [`Transport`] for testing without hardware.
///
/// Expectations are consumed in order. When `send()` is called, the sent
/// data is recorded and matched against the next expectation; its response
/// is then handed out by `receive()`. When no response is pending,
/// `receive()` waits out the full timeout and returns [`Error::Timeout`],
/// the same as a silent serial line. Run such tests with a paused tokio
/// clock.
#[derive(Debug)]
pub struct MockTransport {
    /// Ordered queue of expected request/response pairs.
    expectations: VecDeque<Expectation>,
    /// The response data pending for the next `receive()` call.
    pending_response: Option<Vec<u8>>,
    /// How many bytes of the pending response have been read so far.
    response_cursor: usize,
    /// Whether the transport is "connected".
    connected: bool,
    /// Accept every send and never answer.
    unresponsive: bool,
    /// Log of all bytes sent through this transport.
    sent_log: SentLog,
    purges: usize,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            pending_response: None,
            response_cursor: 0,
            connected: true,
            unresponsive: false,
            sent_log: SentLog::default(),
            purges: 0,
        }
    }

    /// A mock that swallows every command and never replies, like a
    /// controller that is switched off.
    pub fn unresponsive() -> Self {
        MockTransport {
            unresponsive: true,
            ..Self::new()
        }
    }

    /// Add an expected request/response pair.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Expect `request` and answer with a bare ACK.
    pub fn expect_ack(&mut self, request: &[u8]) {
        self.expect(request, &[0x8F]);
    }

    /// Expect `request` and answer with `reply` followed by `;`.
    pub fn expect_reply(&mut self, request: &[u8], reply: &str) {
        let mut response = reply.as_bytes().to_vec();
        response.push(b';');
        self.expect(request, &response);
    }

    /// Handle to the sent-data log that survives moving the mock.
    pub fn sent_log(&self) -> SentLog {
        self.sent_log.clone()
    }

    /// All data that has been sent through this transport so far.
    pub fn sent_data(&self) -> Vec<Vec<u8>> {
        self.sent_log.entries()
    }

    /// Return the number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Number of times `purge()` was called.
    pub fn purge_count(&self) -> usize {
        self.purges
    }

    /// Set the connected state of the mock transport.
    ///
    /// When set to `false`, subsequent `send()` and `receive()` calls will
    /// return [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        self.sent_log.push(data);

        if self.unresponsive {
            return Ok(());
        }

        if let Some(expectation) = self.expectations.pop_front() {
            if data != expectation.request.as_slice() {
                return Err(Error::Transport(format!(
                    "unexpected send data: expected {:02X?}, got {:02X?}",
                    expectation.request, data
                )));
            }
            self.pending_response = Some(expectation.response);
            self.response_cursor = 0;
            Ok(())
        } else {
            Err(Error::Transport(format!(
                "no more expectations in mock transport (got {:02X?})",
                data
            )))
        }
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        let cursor = self.response_cursor;
        if let Some(response) = self.pending_response.as_ref().filter(|r| cursor < r.len()) {
            let remaining = &response[cursor..];
            let n = remaining.len().min(buf.len());
            buf[..n].copy_from_slice(&remaining[..n]);
            self.response_cursor += n;
            return Ok(n);
        }

        // Nothing left to say: behave like a quiet line.
        self.pending_response = None;
        self.response_cursor = 0;
        tokio::time::sleep(timeout).await;
        Err(Error::Timeout)
    }

    async fn purge(&mut self) -> Result<()> {
        self.purges += 1;
        self.pending_response = None;
        self.response_cursor = 0;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.pending_response = None;
        self.response_cursor = 0;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_transport_basic_send_receive() {
        let mut mock = MockTransport::new();
        mock.expect(b"!HGfv;", b"1.2.3;");

        mock.send(b"!HGfv;").await.unwrap();

        let mut buf = [0u8; 64];
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"1.2.3;");
    }

    #[tokio::test]
    async fn mock_transport_sent_log_survives_move() {
        let mut mock = MockTransport::new();
        mock.expect_ack(b"!QDcn;");
        mock.expect_ack(b"!QDps;");
        let log = mock.sent_log();

        let mut boxed: Box<dyn Transport> = Box::new(mock);
        boxed.send(b"!QDcn;").await.unwrap();
        boxed.send(b"!QDps;").await.unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(log.as_strings(), vec!["!QDcn;", "!QDps;"]);
    }

    #[tokio::test]
    async fn mock_transport_wrong_data_errors() {
        let mut mock = MockTransport::new();
        mock.expect(b"!AGak;", b"No;");

        let result = mock.send(b"!AGas;").await;
        assert!(matches!(result.unwrap_err(), Error::Transport(_)));
    }

    #[tokio::test]
    async fn mock_transport_no_expectations_errors() {
        let mut mock = MockTransport::new();
        let result = mock.send(b"!XXxx;").await;
        assert!(matches!(result.unwrap_err(), Error::Transport(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn mock_transport_receive_without_send_times_out() {
        let mut mock = MockTransport::new();
        let mut buf = [0u8; 64];

        let start = tokio::time::Instant::now();
        let result = mock.receive(&mut buf, Duration::from_millis(250)).await;
        assert!(matches!(result.unwrap_err(), Error::Timeout));
        assert!(start.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn mock_transport_unresponsive_swallows_sends() {
        let mut mock = MockTransport::unresponsive();
        let log = mock.sent_log();

        mock.send(&[0xB1]).await.unwrap();
        let mut buf = [0u8; 8];
        let result = mock.receive(&mut buf, Duration::from_secs(1)).await;
        assert!(matches!(result.unwrap_err(), Error::Timeout));
        assert_eq!(log.entries(), vec![vec![0xB1]]);
    }

    #[tokio::test]
    async fn mock_transport_partial_receive() {
        let mut mock = MockTransport::new();
        mock.expect(b"!CGra;", b"12:30:00.0;");
        mock.send(b"!CGra;").await.unwrap();

        let mut buf = [0u8; 4];
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"12:3");

        let mut rest = [0u8; 64];
        let n = mock
            .receive(&mut rest, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&rest[..n], b"0:00.0;");
    }

    #[tokio::test]
    async fn mock_transport_purge_drops_pending() {
        let mut mock = MockTransport::new();
        mock.expect(b"!TGst;", b"10:00:00;");
        mock.send(b"!TGst;").await.unwrap();
        mock.purge().await.unwrap();
        assert_eq!(mock.purge_count(), 1);
        assert!(mock.pending_response.is_none());
    }

    #[tokio::test]
    async fn mock_transport_disconnect() {
        let mut mock = MockTransport::new();
        assert!(mock.is_connected());

        mock.close().await.unwrap();
        assert!(!mock.is_connected());

        let result = mock.send(b"!AGak;").await;
        assert!(matches!(result.unwrap_err(), Error::NotConnected));
    }

    #[tokio::test]
    async fn mock_transport_remaining_expectations() {
        let mut mock = MockTransport::new();
        mock.expect_ack(b"!QDcn;");
        mock.expect_reply(b"!AGak;", "Yes");
        assert_eq!(mock.remaining_expectations(), 2);

        mock.send(b"!QDcn;").await.unwrap();
        assert_eq!(mock.remaining_expectations(), 1);
    }
}
