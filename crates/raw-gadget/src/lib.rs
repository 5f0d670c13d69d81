//! Blocking transport over the Linux raw-gadget UDC interface.
//!
//! raw-gadget (`/dev/raw-gadget`) hands a user-space process endpoint-level
//! control of a USB Device Controller: the process fetches connect/control
//! events, answers control transfers on endpoint 0, and moves data on the
//! endpoints it enables. Every call is a blocking ioctl with no timeout.
//!
//! The crate exposes the device-side call contract as the
//! [`GadgetTransport`] trait so protocol logic can run against
//! [`mock::MockTransport`] in tests; [`RawGadget`] is the real kernel
//! implementation.
//!
//! ## Modules
//!
//! - [`caps`]: hardware endpoint capability records
//! - [`transport`]: the trait, the kernel transport, and the mock

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]

pub mod caps;
#[cfg(target_os = "linux")]
mod sys;
pub mod transport;

pub use caps::EndpointCaps;
#[cfg(target_os = "linux")]
pub use transport::RawGadget;
pub use transport::{mock, EpHandle, GadgetEvent, GadgetTransport, Speed};

use std::io;
use thiserror::Error;

/// Largest transfer the control endpoint buffer accepts.
pub const EP0_MAX_DATA: usize = 256;

/// Errors returned by gadget transport operations.
#[derive(Error, Debug)]
pub enum GadgetError {
    /// Opening the raw-gadget character device failed.
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A raw-gadget ioctl failed.
    #[error("{op} failed: {source}")]
    Ioctl {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// A UDC driver or device name exceeds the kernel's 128-byte field.
    #[error("UDC name too long: {len} bytes (maximum {max})")]
    NameTooLong { len: usize, max: usize },

    /// A payload larger than the endpoint I/O buffer.
    #[error("payload of {len} bytes exceeds endpoint buffer of {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// The transport has no more events to deliver (mock script exhausted
    /// or the UDC side went away).
    #[error("transport disconnected")]
    Disconnected,
}

/// Convenience result alias for gadget transport operations.
pub type GadgetResult<T> = Result<T, GadgetError>;
