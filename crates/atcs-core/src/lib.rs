//! atcs-core: Core traits, types, and error definitions for ATCS mount control.
//!
//! This crate holds the pieces every other atcs crate agrees on. Drivers,
//! transports, and test harnesses depend on it without depending on each
//! other.
//!
//! # Key types
//!
//! - [`Transport`] / [`PortOpener`] -- byte-level communication channel
//! - [`SkyGeometry`] -- host-supplied clock and hour-angle lookups
//! - [`angle`] -- sexagesimal codec for right ascension and declination
//! - [`Error`] / [`Result`] -- error handling

pub mod angle;
pub mod error;
pub mod geometry;
pub mod transport;
pub mod types;

pub use angle::Sign;
pub use error::{Error, Result};
pub use geometry::{BasicGeometry, SkyGeometry};
pub use transport::{PortOpener, Transport};
pub use types::*;
