//! MountBuilder -- fluent builder for [`AtcsMount`] instances.
//!
//! # Example
//!
//! ```no_run
//! use atcs::{MountBuilder, MountTopology};
//! use std::time::Duration;
//!
//! # async fn example() -> atcs::Result<()> {
//! let mut mount = MountBuilder::new()
//!     .serial_port("/dev/ttyUSB0")
//!     .topology(MountTopology::AsymmetricalEquatorial)
//!     .command_timeout(Duration::from_millis(1500))
//!     .build()
//!     .await?;
//! let pos = mount.ra_dec().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use atcs_core::error::{Error, Result};
use atcs_core::geometry::{BasicGeometry, SkyGeometry};
use atcs_core::transport::{PortOpener, Transport};
use atcs_core::types::MountTopology;
use atcs_transport::{SerialConfig, SerialOpener};

use crate::mount::{AtcsMount, MountConfig};

/// Fluent builder for [`AtcsMount`].
pub struct MountBuilder {
    config: MountConfig,
    serial_port: Option<String>,
    serial_config: SerialConfig,
    opener: Option<Arc<dyn PortOpener>>,
    geometry: Option<Arc<dyn SkyGeometry>>,
}

impl MountBuilder {
    pub fn new() -> Self {
        MountBuilder {
            config: MountConfig::default(),
            serial_port: None,
            serial_config: SerialConfig::default(),
            opener: None,
            geometry: None,
        }
    }

    /// Serial device path (e.g. `/dev/ttyUSB0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the baud rate. The controller only speaks 19200.
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.serial_config.baud_rate = baud;
        self
    }

    pub fn serial_config(mut self, config: SerialConfig) -> Self {
        self.serial_config = config;
        self
    }

    pub fn topology(mut self, topology: MountTopology) -> Self {
        self.config.topology = topology;
        self
    }

    /// Per-frame reply timeout.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.config.command_timeout = timeout;
        self
    }

    pub fn handshake_budget(mut self, budget: Duration) -> Self {
        self.config.handshake_budget = budget;
        self
    }

    pub fn slew_settle(mut self, settle: Duration) -> Self {
        self.config.slew_settle = settle;
        self
    }

    pub fn max_frame(mut self, bytes: usize) -> Self {
        self.config.max_frame = bytes;
        self
    }

    /// Use `opener` instead of the serial port opener.
    pub fn opener(mut self, opener: Arc<dyn PortOpener>) -> Self {
        self.opener = Some(opener);
        self
    }

    /// Clock and hour-angle source. Defaults to the host's local clock.
    pub fn geometry(mut self, geometry: Arc<dyn SkyGeometry>) -> Self {
        self.geometry = Some(geometry);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.config.command_timeout.is_zero() {
            return Err(Error::InvalidParameter(
                "command_timeout must be non-zero".into(),
            ));
        }
        if self.config.max_frame == 0 {
            return Err(Error::InvalidParameter("max_frame must be non-zero".into()));
        }
        Ok(())
    }

    /// Build a mount that is not yet connected. Call
    /// [`connect()`](AtcsMount::connect) on it later.
    pub fn build_disconnected(self) -> Result<AtcsMount> {
        self.validate()?;
        let opener: Arc<dyn PortOpener> = match self.opener {
            Some(opener) => opener,
            None => Arc::new(SerialOpener::new(self.serial_config)),
        };
        let geometry: Arc<dyn SkyGeometry> = match self.geometry {
            Some(geometry) => geometry,
            None => Arc::new(BasicGeometry),
        };
        Ok(AtcsMount::new(self.config, opener, geometry))
    }

    /// Build a mount on a caller-provided transport.
    ///
    /// The link is taken as already established: no handshake and no
    /// connect housekeeping. This is the entry point for tests (pass a
    /// `MockTransport` from `atcs-test-harness`).
    pub fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<AtcsMount> {
        let mut mount = self.build_disconnected()?;
        mount.attach(transport);
        Ok(mount)
    }

    /// Build a mount and connect it.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been called.
    pub async fn build(self) -> Result<AtcsMount> {
        let port = self
            .serial_port
            .clone()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for build()".into()))?;
        let mut mount = self.build_disconnected()?;
        mount.connect(&port).await?;
        Ok(mount)
    }
}

impl Default for MountBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atcs_test_harness::{MockOpener, MockTransport};

    #[test]
    fn builder_defaults() {
        let mount = MountBuilder::new().build_disconnected().unwrap();
        let config = mount.config();
        assert_eq!(config.topology, MountTopology::SymmetricalEquatorial);
        assert_eq!(config.command_timeout, Duration::from_secs(1));
        assert_eq!(config.handshake_budget, Duration::from_secs(3));
        assert_eq!(config.slew_settle, Duration::from_secs(2));
        assert_eq!(config.max_frame, 256);
        assert!(!mount.is_connected());
    }

    #[test]
    fn builder_custom_settings() {
        let mount = MountBuilder::new()
            .serial_port("/dev/ttyUSB0")
            .baud_rate(9600)
            .topology(MountTopology::AltAz)
            .command_timeout(Duration::from_millis(500))
            .handshake_budget(Duration::from_secs(5))
            .slew_settle(Duration::from_secs(1))
            .max_frame(128)
            .build_disconnected()
            .unwrap();

        let config = mount.config();
        assert_eq!(config.topology, MountTopology::AltAz);
        assert_eq!(config.command_timeout, Duration::from_millis(500));
        assert_eq!(config.max_frame, 128);
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        let result = MountBuilder::new()
            .command_timeout(Duration::ZERO)
            .build_disconnected();
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn builder_serial_port_required_for_build() {
        let result = MountBuilder::new().build().await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn build_with_transport_is_ready() {
        let mut mock = MockTransport::new();
        mock.expect_reply(b"!HGfv;", "2.1.7");
        let mut mount = MountBuilder::new()
            .build_with_transport(Box::new(mock))
            .unwrap();

        assert!(mount.is_connected());
        assert_eq!(mount.firmware_version().await.unwrap(), "2.1.7");
    }

    #[tokio::test]
    async fn build_connects_through_opener() {
        let mut mock = MockTransport::new();
        mock.expect_ack(&[0xB1]);
        mock.expect_ack(b"!QDcn;");
        mock.expect_ack(b"!QDps;");
        mock.expect_ack(b"!QDcn;");
        mock.expect_ack(b"!NSatPolar;");
        mock.expect_ack(b"!NSmpLower;");
        mock.expect_ack(b"!PSepNow;");
        mock.expect_reply(b"!ACst;", "Yes");
        mock.expect_reply(b"!TGlf;", "24hr");
        mock.expect_reply(b"!TGdf;", "mm/dd/yy");
        mock.expect_reply(b"!AGak;", "Yes");

        let mount = MountBuilder::new()
            .serial_port("/dev/ttyUSB0")
            .opener(Arc::new(MockOpener::with(mock)))
            .build()
            .await
            .unwrap();
        assert!(mount.is_connected());
    }

    #[tokio::test]
    async fn build_reports_missing_port() {
        let result = MountBuilder::new()
            .serial_port("/dev/ttyUSB7")
            .opener(Arc::new(MockOpener::failing()))
            .build()
            .await;
        assert!(matches!(result, Err(Error::CommLink(_))));
    }
}
