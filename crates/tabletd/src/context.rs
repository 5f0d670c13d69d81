//! Per-connection device state.

use hid_pen_protocol::DescriptorSet;
use softtablet_raw_gadget::EpHandle;

use crate::streamer::Streamer;

/// Configuration state driven by SET_CONFIGURATION.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceState {
    #[default]
    Unconfigured,
    Configured,
}

/// Everything tied to the lifetime of one host connection.
///
/// Rebuilt from scratch on every connect event; replacing the old context
/// drops its streamer, which stops the report thread before the new
/// connection is served.
#[derive(Debug)]
pub struct ConnectionContext {
    /// Descriptor chain with the negotiated endpoint address baked in.
    pub descriptors: DescriptorSet,
    pub state: DeviceState,
    /// Kernel handle of the enabled interrupt-IN endpoint, set by
    /// SET_CONFIGURATION and never changed afterwards.
    pub int_in: Option<EpHandle>,
    /// Running report streamer, started once by the first SET_IDLE.
    pub streamer: Option<Streamer>,
}

impl ConnectionContext {
    pub fn new(descriptors: DescriptorSet) -> Self {
        Self {
            descriptors,
            state: DeviceState::Unconfigured,
            int_in: None,
            streamer: None,
        }
    }
}
