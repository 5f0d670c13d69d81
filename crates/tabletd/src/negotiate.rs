//! Endpoint negotiation.
//!
//! The device model wants one interrupt-IN endpoint; the UDC reports what
//! its hardware can do. Negotiation walks the capability list in kernel
//! order and claims the first endpoint that fits, taking the hardware's
//! fixed number when it has one and the first free number otherwise.

use hid_pen_protocol::ids;
use hid_pen_protocol::EndpointDescriptor;
use softtablet_raw_gadget::EndpointCaps;
use tracing::debug;

use crate::{EmulatorError, EmulatorResult};

/// Match the tablet's interrupt-IN endpoint against `eps` and return the
/// fully addressed descriptor.
///
/// # Errors
///
/// Returns [`EmulatorError::NoMatchingEndpoint`] when no hardware endpoint
/// supports interrupt transfers in the IN direction at the required packet
/// size.
pub fn negotiate_interrupt_in(eps: &[EndpointCaps]) -> EmulatorResult<EndpointDescriptor> {
    for caps in eps {
        if !(caps.interrupt && caps.dir_in) {
            continue;
        }
        if caps.maxpacket_limit < ids::INT_MAX_PACKET {
            continue;
        }
        let mut descriptor = EndpointDescriptor::interrupt_in();
        descriptor.assign(caps.fixed_addr.unwrap_or(1));
        debug!(
            hardware = %caps.name,
            address = format_args!("{:#04x}", descriptor.address),
            "claimed interrupt IN endpoint"
        );
        return Ok(descriptor);
    }
    Err(EmulatorError::NoMatchingEndpoint)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use hid_pen_protocol::usb;

    #[test]
    fn claims_first_capable_endpoint() {
        let eps = vec![
            EndpointCaps::bulk_out_only("ep2out"),
            EndpointCaps::any_direction_any_type("ep-a"),
            EndpointCaps::any_direction_any_type("ep-b"),
        ];
        let descriptor = negotiate_interrupt_in(&eps).unwrap();
        assert_eq!(descriptor.address, usb::DIR_IN | 1);
        assert_eq!(descriptor.max_packet_size, ids::INT_MAX_PACKET);
        assert_eq!(descriptor.interval, ids::INT_INTERVAL);
    }

    #[test]
    fn fixed_hardware_number_wins() {
        let mut fixed = EndpointCaps::any_direction_any_type("ep5in");
        fixed.fixed_addr = Some(5);
        let descriptor = negotiate_interrupt_in(&[fixed]).unwrap();
        assert_eq!(descriptor.number(), 5);
        assert!(descriptor.is_in());
    }

    #[test]
    fn rejects_hardware_without_interrupt_in() {
        let eps = vec![
            EndpointCaps::bulk_out_only("ep1out"),
            EndpointCaps::bulk_out_only("ep2out"),
        ];
        assert!(matches!(
            negotiate_interrupt_in(&eps),
            Err(EmulatorError::NoMatchingEndpoint)
        ));
    }

    #[test]
    fn skips_endpoints_with_tiny_packet_limit() {
        let mut small = EndpointCaps::any_direction_any_type("ep-tiny");
        small.maxpacket_limit = 4;
        let eps = vec![small, EndpointCaps::any_direction_any_type("ep-ok")];
        let descriptor = negotiate_interrupt_in(&eps).unwrap();
        assert_eq!(descriptor.number(), 1);
    }

    #[test]
    fn empty_capability_list_is_an_error() {
        assert!(matches!(
            negotiate_interrupt_in(&[]),
            Err(EmulatorError::NoMatchingEndpoint)
        ));
    }
}
