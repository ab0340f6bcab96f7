//! # atcs -- Mount control for ATCS telescope controllers
//!
//! `atcs` drives ATCS mount controllers over their ATCL serial protocol:
//! coordinates, sync, goto, open-loop moves, tracking, park, site and
//! clock.
//!
//! ## Quick Start
//!
//! ```no_run
//! use atcs::{Direction, MountBuilder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut mount = MountBuilder::new()
//!         .serial_port("/dev/ttyUSB0")
//!         .build()
//!         .await?;
//!
//!     let pos = mount.ra_dec().await?;
//!     println!("RA {:.4}h  Dec {:.4}°", pos.ra, pos.dec);
//!
//!     mount.start_open_loop(Direction::North, 2).await?;
//!     mount.stop_open_loop().await?;
//!     mount.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! | Crate               | Purpose                                         |
//! |---------------------|-------------------------------------------------|
//! | `atcs-core`         | Transport trait, angle codec, types, errors     |
//! | `atcs-transport`    | Serial port transport (19200 8N1, DTR)          |
//! | `atcs-atcl`         | ATCL framing: ACK/NACK, payloads, async notices |
//! | **`atcs`**          | Command catalog and the mount itself            |
//!
//! Every operation on a mount that is not connected fails with
//! [`Error::NotConnected`] without touching the port.

pub mod builder;
pub mod commands;
pub mod mount;
pub mod session;
pub mod site;

pub use atcs_core::*;

pub use builder::MountBuilder;
pub use commands::{Arg, CommandSpec, Value};
pub use mount::{AtcsMount, MountConfig, OPEN_LOOP_RATES};
pub use session::{LinkState, Session};

/// ATCL framing layer.
pub mod atcl {
    pub use atcs_atcl::*;
}

/// Serial transport.
pub mod transport {
    pub use atcs_transport::*;
}
