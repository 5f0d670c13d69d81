//! The transport event loop.

use std::sync::Arc;

use hid_pen_protocol::DescriptorSet;
use softtablet_raw_gadget::{GadgetError, GadgetEvent, GadgetTransport};
use tracing::{debug, info, warn};

use crate::context::ConnectionContext;
use crate::{ep0, negotiate, EmulatorResult};

/// Fetch and dispatch transport events until the transport disconnects or
/// a fatal error occurs.
///
/// # Errors
///
/// Returns [`crate::EmulatorError`] on transport I/O failure, failed
/// endpoint negotiation, or an internal encoding bug. Disconnection is a
/// clean return.
pub fn run_event_loop(transport: Arc<dyn GadgetTransport>) -> EmulatorResult<()> {
    let mut connection: Option<ConnectionContext> = None;
    loop {
        match transport.fetch_event() {
            Ok(GadgetEvent::Connect) => {
                let eps = transport.eps_info()?;
                info!(hardware_endpoints = eps.len(), "host connected");
                for caps in &eps {
                    debug!(
                        name = %caps.name,
                        fixed_addr = caps.fixed_addr,
                        interrupt = caps.interrupt,
                        dir_in = caps.dir_in,
                        dir_out = caps.dir_out,
                        maxpacket = caps.maxpacket_limit,
                        "hardware endpoint"
                    );
                }
                let mut descriptors = DescriptorSet::tablet();
                descriptors.endpoint = negotiate::negotiate_interrupt_in(&eps)?;
                // Replacing the context drops the previous connection's
                // streamer before any new control traffic is served.
                connection = Some(ConnectionContext::new(descriptors));
            }
            Ok(GadgetEvent::Control(setup)) => match connection.as_mut() {
                Some(ctx) => ep0::handle_control(&transport, ctx, setup)?,
                None => {
                    warn!("control transfer before connect, stalling");
                    transport.ep0_stall()?;
                }
            },
            Ok(GadgetEvent::Unknown(event_type)) => {
                debug!(event_type, "skipping unmodeled event");
            }
            Err(GadgetError::Disconnected) => {
                info!("transport disconnected, shutting down");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }
    }
}
