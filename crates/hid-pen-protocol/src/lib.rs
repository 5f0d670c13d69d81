//! USB HID protocol implementation for the SoftTablet pen digitizer.
//!
//! This crate is the I/O-free half of the emulator: everything that can be
//! computed without touching a UDC lives here, so it can be tested without
//! a kernel.
//!
//! ## Wire layout
//!
//! The device presents one configuration, one HID interface, and one
//! interrupt-IN endpoint. The input report is fixed at 8 bytes:
//!
//! | Field | Type | Description |
//! |-------|------|-------------|
//! | Report ID | `u8` | Always 6 |
//! | Switches | `u8` | tip, barrel, eraser, invert, pad, in-range (bits 0–5) |
//! | X | `u16` LE | 0–16000 |
//! | Y | `u16` LE | 0–9000 |
//! | Tip pressure | `u16` LE | 0–1023 |
//!
//! All multi-byte descriptor fields are little-endian with no implicit
//! padding, per the USB 2.0 and HID 1.11 specifications. Descriptors are
//! serialized field-by-field rather than via `repr(packed)` casts so the
//! wire layout is explicit at every call site.
//!
//! ## Modules
//!
//! - [`usb`]: USB ch9 / HID class constants
//! - [`ids`]: device identity (VID/PID, strings, packet sizes)
//! - [`descriptors`]: descriptor records and the configuration-chain builder
//! - [`strings`]: string descriptor generation
//! - [`control`]: SETUP packet parsing
//! - [`report`]: pen input report and the rectangular demo motion path

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]

pub mod control;
pub mod descriptors;
pub mod ids;
pub mod report;
pub mod strings;
pub mod usb;

pub use control::{ControlRequest, Direction, Recipient, RequestKind};
pub use descriptors::{
    ConfigurationDescriptor, DescriptorSet, DeviceDescriptor, DeviceQualifierDescriptor,
    EndpointDescriptor, HidDescriptor, InterfaceDescriptor, REPORT_DESCRIPTOR,
};
pub use report::{MotionPhase, PenPath, PenReport};
pub use strings::string_descriptor;

use thiserror::Error;

/// Errors returned by pen protocol operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenProtocolError {
    /// A caller-supplied buffer cannot hold the requested encoding.
    #[error("buffer too small: need {needed} bytes, have {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },

    /// No string descriptor exists for the requested index/language pair.
    #[error("unknown string descriptor: index {index}, language {lang:#06x}")]
    UnknownStringDescriptor { index: u8, lang: u16 },

    /// A SETUP packet shorter than the required 8 bytes.
    #[error("truncated control request: got {actual} of 8 bytes")]
    TruncatedControlRequest { actual: usize },
}

/// Convenience result alias for pen protocol operations.
pub type PenProtocolResult<T> = Result<T, PenProtocolError>;
