//! atcs-test-harness: Mock transports and fixtures for atcs.
//!
//! [`MockTransport`] drives the ATCL framer and the mount state machine
//! deterministically without a controller on the bench. [`MockOpener`]
//! hands mocks to the mount's connect path, and [`FixedGeometry`] pins the
//! host clock so time/date commands are predictable.

pub mod fixtures;
pub mod mock_serial;

pub use fixtures::{FixedGeometry, MockOpener};
pub use mock_serial::{MockTransport, SentLog};
