//! Pen tablet emulator daemon.
//!
//! Ties the I/O-free protocol crate to a gadget transport: the event loop
//! in [`dispatch`] negotiates an interrupt-IN endpoint on connect, answers
//! enumeration on endpoint 0, and hands report streaming to a background
//! thread once the host issues SET_IDLE.
//!
//! ## Modules
//!
//! - [`context`]: per-connection device state
//! - [`negotiate`]: logical-to-hardware endpoint matching
//! - [`ep0`]: control-transfer handling
//! - [`streamer`]: the interrupt report thread
//! - [`dispatch`]: the transport event loop

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]

pub mod context;
pub mod dispatch;
pub mod ep0;
pub mod negotiate;
pub mod streamer;

pub use context::{ConnectionContext, DeviceState};
pub use dispatch::run_event_loop;

use std::io;

use hid_pen_protocol::PenProtocolError;
use softtablet_raw_gadget::GadgetError;
use thiserror::Error;

/// Fatal emulator failures. Protocol-recoverable conditions (unsupported
/// requests, unknown string descriptors) never surface here; they are
/// answered with an endpoint 0 stall instead.
#[derive(Error, Debug)]
pub enum EmulatorError {
    /// The gadget transport failed.
    #[error("transport failure: {0}")]
    Transport(#[from] GadgetError),

    /// The protocol layer hit an unrecoverable encoding problem.
    #[error("protocol failure: {0}")]
    Protocol(#[from] PenProtocolError),

    /// The UDC offers no endpoint that can carry the interrupt-IN pipe.
    #[error("no hardware endpoint supports an interrupt IN pipe")]
    NoMatchingEndpoint,

    /// The OS refused the report streamer thread.
    #[error("failed to start the report streamer thread")]
    StreamerSpawn(#[source] io::Error),
}

/// Convenience result alias for emulator operations.
pub type EmulatorResult<T> = Result<T, EmulatorError>;
