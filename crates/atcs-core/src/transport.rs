//! Transport traits for mount communication.
//!
//! The [`Transport`] trait abstracts over the physical link to an ATCS
//! controller. The ATCL framer in `atcs-atcl` operates on a `Transport`
//! rather than on a serial port directly, so the same code drives real
//! hardware and the `MockTransport` from `atcs-test-harness`.
//!
//! [`PortOpener`] is the factory the mount uses on connect. It lets the mount
//! own its whole link lifecycle (open, handshake, close, reopen) without
//! knowing whether the port is real.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to a controller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes, returning once they have been written and flushed.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes into the provided buffer.
    ///
    /// Returns the number of bytes read. Waits up to `timeout` for data;
    /// returns [`Error::Timeout`](crate::error::Error::Timeout) if nothing
    /// arrives before then.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Discard anything sitting in the receive and transmit buffers.
    async fn purge(&mut self) -> Result<()>;

    /// Close the transport connection.
    ///
    /// After calling `close()`, subsequent `send()` and `receive()` calls
    /// should return [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}

/// Opens a named port and hands back a ready [`Transport`].
#[async_trait]
pub trait PortOpener: Send + Sync {
    /// Open `port`. Failures are reported as
    /// [`Error::CommLink`](crate::error::Error::CommLink).
    async fn open(&self, port: &str) -> Result<Box<dyn Transport>>;
}
