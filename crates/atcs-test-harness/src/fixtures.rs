//! Port opener and geometry fixtures.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::VecDeque;
use std::sync::Mutex;

use atcs_core::error::{Error, Result};
use atcs_core::geometry::SkyGeometry;
use atcs_core::transport::{PortOpener, Transport};

use crate::mock_serial::MockTransport;

/// A [`PortOpener`] that hands out pre-built mocks in order.
///
/// Opening fails with [`Error::CommLink`] once the queue runs dry, or on
/// every call for an opener built with [`MockOpener::failing`].
#[derive(Debug, Default)]
pub struct MockOpener {
    ports: Mutex<VecDeque<MockTransport>>,
    fail: bool,
}

impl MockOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// An opener with one mock ready to go.
    pub fn with(mock: MockTransport) -> Self {
        let opener = Self::new();
        opener.push(mock);
        opener
    }

    /// An opener whose port never opens.
    pub fn failing() -> Self {
        MockOpener {
            fail: true,
            ..Self::default()
        }
    }

    /// Queue another mock for the next `open()`.
    pub fn push(&self, mock: MockTransport) {
        if let Ok(mut ports) = self.ports.lock() {
            ports.push_back(mock);
        }
    }
}

#[async_trait]
impl PortOpener for MockOpener {
    async fn open(&self, port: &str) -> Result<Box<dyn Transport>> {
        if self.fail {
            return Err(Error::CommLink(format!("{port}: device not found")));
        }
        let next = self
            .ports
            .lock()
            .map_err(|_| Error::CommLink(format!("{port}: opener poisoned")))?
            .pop_front();
        match next {
            Some(mock) => Ok(Box::new(mock)),
            None => Err(Error::CommLink(format!("{port}: no mock port queued"))),
        }
    }
}

/// Geometry with a frozen clock and a `deg / 15` hour angle.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeometry {
    pub now: NaiveDateTime,
}

impl FixedGeometry {
    pub fn new(now: NaiveDateTime) -> Self {
        FixedGeometry { now }
    }
}

impl SkyGeometry for FixedGeometry {
    fn local_date_time(&self) -> NaiveDateTime {
        self.now
    }

    fn hour_angle(&self, angle_deg: f64) -> f64 {
        angle_deg / 15.0
    }
}
