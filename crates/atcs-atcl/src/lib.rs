//! ATCL framing for ATCS mount controllers.
//!
//! ATCL is a half-duplex ASCII protocol: the host sends `!<opcode><args>;`
//! and the controller answers with a single ACK/NACK byte or a
//! `;`-terminated payload. Asynchronous notices can turn up in front of any
//! reply and have to be read past.
//!
//! # Architecture
//!
//! - [`protocol`] -- sentinel bytes, command encoding, pure frame decoding
//! - [`io`] -- the [`Framer`](io::Framer) that owns the transport and runs
//!   one exchange at a time

pub mod io;
pub mod protocol;

pub use io::{Framer, FramerConfig, Reply};
