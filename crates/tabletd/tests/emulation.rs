//! End-to-end enumeration tests against the mock transport.
//!
//! Each test scripts the event sequence a host-side stack would produce
//! and asserts on the bytes the device puts on the wire.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use hid_pen_protocol::{ids, usb, REPORT_DESCRIPTOR};
use softtablet_raw_gadget::mock::MockTransport;
use softtablet_raw_gadget::{EndpointCaps, GadgetEvent, GadgetTransport};
use tabletd::{run_event_loop, EmulatorError};

fn get_descriptor(request_type: u8, descriptor_type: u8, index: u8, lang: u16, length: u16) -> [u8; 8] {
    let [v0, v1] = ((u16::from(descriptor_type) << 8) | u16::from(index)).to_le_bytes();
    let [i0, i1] = lang.to_le_bytes();
    let [l0, l1] = length.to_le_bytes();
    [request_type, usb::REQ_GET_DESCRIPTOR, v0, v1, i0, i1, l0, l1]
}

const SET_CONFIGURATION: [u8; 8] = [0x00, usb::REQ_SET_CONFIGURATION, 1, 0, 0, 0, 0, 0];
const SET_IDLE: [u8; 8] = [0x21, usb::HID_REQ_SET_IDLE, 0, 0, 0, 0, 0, 0];

fn connected_mock() -> Arc<MockTransport> {
    let mock = Arc::new(MockTransport::new());
    mock.set_caps(vec![
        EndpointCaps::bulk_out_only("ep2out"),
        EndpointCaps::any_direction_any_type("ep-a"),
    ]);
    mock.push_event(GadgetEvent::Connect);
    mock
}

fn run(mock: &Arc<MockTransport>) {
    run_event_loop(Arc::clone(mock) as Arc<dyn GadgetTransport>).unwrap();
}

#[test]
fn enumeration_answers_standard_descriptor_requests() {
    let mock = connected_mock();
    mock.push_control(get_descriptor(0x80, usb::DT_DEVICE, 0, 0, 64));
    mock.push_control(get_descriptor(0x80, usb::DT_CONFIG, 0, 0, 255));
    run(&mock);

    let written = mock.ep0_written();
    assert_eq!(written.len(), 2);

    let device = &written[0];
    assert_eq!(device.len(), 18);
    assert_eq!(&device[..4], &[18, usb::DT_DEVICE, 0x00, 0x02]);
    assert_eq!(device[7], ids::EP0_MAX_PACKET);
    assert_eq!(u16::from_le_bytes([device[8], device[9]]), ids::VENDOR_ID);
    assert_eq!(u16::from_le_bytes([device[10], device[11]]), ids::PRODUCT_ID);

    let config = &written[1];
    assert_eq!(config.len(), 34);
    assert_eq!(u16::from_le_bytes([config[2], config[3]]), 34);
    // The endpoint descriptor at the tail carries the negotiated address.
    assert_eq!(&config[27..34], &[7, usb::DT_ENDPOINT, 0x81, 3, 8, 0, 5]);
}

#[test]
fn wlength_truncates_in_replies() {
    let mock = connected_mock();
    mock.push_control(get_descriptor(0x80, usb::DT_DEVICE, 0, 0, 8));
    run(&mock);
    assert_eq!(mock.ep0_written()[0].len(), 8);
}

#[test]
fn string_descriptors_resolve() {
    let mock = connected_mock();
    mock.push_control(get_descriptor(0x80, usb::DT_STRING, 0, 0, 255));
    mock.push_control(get_descriptor(0x80, usb::DT_STRING, 1, ids::LANG_EN_US, 255));
    run(&mock);

    let written = mock.ep0_written();
    assert_eq!(written[0].as_slice(), &[4, usb::DT_STRING, 0x09, 0x04]);
    // "Wacom Co., Ltd." in UTF-16LE with a trailing NUL code unit.
    assert_eq!(written[1].len(), (15 + 1) * 2 + 2);
    assert_eq!(&written[1][..4], &[34, usb::DT_STRING, b'W', 0]);
}

#[test]
fn report_descriptor_is_served_on_the_interface() {
    let mock = connected_mock();
    mock.push_control(get_descriptor(0x81, usb::DT_REPORT, 0, 0, 255));
    run(&mock);

    let written = mock.ep0_written();
    assert_eq!(written[0].as_slice(), REPORT_DESCRIPTOR);
}

#[test]
fn standalone_hid_descriptor_requests_are_stalled() {
    // The HID descriptor only travels embedded in the configuration chain.
    let mock = connected_mock();
    mock.push_control(get_descriptor(0x81, usb::DT_HID, 0, 0, 255));
    run(&mock);

    assert_eq!(mock.stall_count(), 1);
    assert!(mock.ep0_written().is_empty());
}

#[test]
fn set_report_reads_exactly_one_byte() {
    let mock = connected_mock();
    // SET_REPORT for the output report, host offering 8 bytes.
    mock.push_control([0x21, usb::HID_REQ_SET_REPORT, 0, 2, 0, 0, 8, 0]);
    run(&mock);

    assert_eq!(mock.stall_count(), 0);
    assert_eq!(mock.ep0_read_lens(), vec![1]);
}

#[test]
fn set_configuration_enables_the_negotiated_endpoint() {
    let mock = connected_mock();
    mock.push_control(SET_CONFIGURATION);
    run(&mock);

    assert_eq!(
        mock.enabled_endpoints(),
        vec![[7, usb::DT_ENDPOINT, 0x81, 3, 8, 0, 5]]
    );
    assert_eq!(mock.vbus_power(), u32::from(ids::MAX_POWER));
    assert!(mock.is_configured());
}

#[test]
fn replayed_set_configuration_is_idempotent() {
    let mock = connected_mock();
    mock.push_control(SET_CONFIGURATION);
    mock.push_control(SET_CONFIGURATION);
    run(&mock);

    assert_eq!(mock.enabled_endpoints().len(), 1);
    assert_eq!(mock.stall_count(), 0);
}

#[test]
fn set_idle_starts_the_report_stream() {
    let mock = connected_mock();
    mock.push_control(SET_CONFIGURATION);
    mock.push_control(SET_IDLE);
    run(&mock);

    let reports = mock.ep_written();
    assert!(!reports.is_empty());
    let (ep, first) = &reports[0];
    // The mock hands out handle 1 for the first enabled endpoint.
    assert_eq!(*ep, 1);
    // First report: one step along the top edge, hovering.
    assert_eq!(first.as_slice(), &[6, 0b0010_0000, 0x34, 0x08, 0xD0, 0x07, 0, 0]);
}

#[test]
fn unsupported_requests_stall_endpoint_zero() {
    let mock = connected_mock();
    // Vendor request, unknown string index, unknown standard request.
    mock.push_control([0xC0, 0x01, 0, 0, 0, 0, 4, 0]);
    mock.push_control(get_descriptor(0x80, usb::DT_STRING, 9, ids::LANG_EN_US, 255));
    mock.push_control([0x80, usb::REQ_GET_STATUS, 0, 0, 0, 0, 2, 0]);
    run(&mock);

    assert_eq!(mock.stall_count(), 3);
    assert!(mock.ep0_written().is_empty());
    // The device keeps running: a later request is still answered.
    let mock = connected_mock();
    mock.push_control([0xC0, 0x01, 0, 0, 0, 0, 4, 0]);
    mock.push_control(get_descriptor(0x80, usb::DT_DEVICE, 0, 0, 64));
    run(&mock);
    assert_eq!(mock.ep0_written().len(), 1);
}

#[test]
fn control_before_connect_is_stalled() {
    let mock = Arc::new(MockTransport::new());
    mock.push_control(get_descriptor(0x80, usb::DT_DEVICE, 0, 0, 64));
    run(&mock);
    assert_eq!(mock.stall_count(), 1);
}

#[test]
fn connect_without_usable_endpoints_is_fatal() {
    let mock = Arc::new(MockTransport::new());
    mock.set_caps(vec![EndpointCaps::bulk_out_only("ep1out")]);
    mock.push_event(GadgetEvent::Connect);
    let err = run_event_loop(Arc::clone(&mock) as Arc<dyn GadgetTransport>).unwrap_err();
    assert!(matches!(err, EmulatorError::NoMatchingEndpoint));
}

#[test]
fn unknown_events_are_skipped() {
    let mock = connected_mock();
    mock.push_event(GadgetEvent::Unknown(7));
    mock.push_control(get_descriptor(0x80, usb::DT_DEVICE, 0, 0, 64));
    run(&mock);
    assert_eq!(mock.ep0_written().len(), 1);
    assert_eq!(mock.stall_count(), 0);
}
