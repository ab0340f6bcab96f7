//! Transport implementations for atcs.
//!
//! This crate provides the concrete serial implementation of the
//! [`Transport`](atcs_core::Transport) trait from `atcs-core`, plus a
//! [`SerialOpener`] the mount uses to open ports on connect.
//!
//! # Example
//!
//! ```no_run
//! use atcs_transport::SerialTransport;
//! use atcs_core::transport::Transport;
//! use std::time::Duration;
//!
//! # async fn example() -> atcs_core::Result<()> {
//! let mut transport = SerialTransport::open("/dev/ttyUSB0").await?;
//!
//! // Ask the controller for its firmware version.
//! transport.send(b"!HGfv;").await?;
//!
//! let mut buf = [0u8; 256];
//! let n = transport.receive(&mut buf, Duration::from_secs(1)).await?;
//! # Ok(())
//! # }
//! ```

pub mod serial;

pub use serial::{DataBits, Parity, SerialConfig, SerialOpener, SerialTransport, StopBits};
