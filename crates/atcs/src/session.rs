//! Per-connection mount state.

use tokio::time::Instant;

use atcs_core::types::{DateOrder, Direction, SoftLimits, TimeFormat};

/// Where the connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    /// Port open, waiting for the controller to answer.
    Handshaking,
    /// Controller answered; pushing session settings.
    Configuring,
    Ready,
}

/// Everything the mount remembers between calls. Cleared on disconnect.
///
/// Alignment is not kept here. It can change from the hand paddle, so it
/// is always read from the controller.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub link: LinkState,
    /// Coordinates are exchanged in JNOW.
    pub jnow: bool,
    pub time_format: TimeFormat,
    pub date_order: DateOrder,
    /// The controller's clock had been set before this connection.
    pub time_set_once: bool,
    /// Direction of the open-loop move in progress, if any.
    pub open_loop: Option<Direction>,
    pub soft_limits: Option<SoftLimits>,
    /// When the last goto was issued.
    pub slew_started: Option<Instant>,
    pub site_number: Option<u32>,
}

impl Session {
    pub fn reset(&mut self) {
        *self = Session::default();
    }

    pub fn is_ready(&self) -> bool {
        self.link == LinkState::Ready
    }
}
