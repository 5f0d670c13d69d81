//! USB ch9 and HID class constants used on the control endpoint.
//!
//! Only the subset this device actually speaks is defined; the dispatch
//! code treats everything else as unsupported and stalls.

/// Descriptor type: device (`USB_DT_DEVICE`).
pub const DT_DEVICE: u8 = 0x01;
/// Descriptor type: configuration (`USB_DT_CONFIG`).
pub const DT_CONFIG: u8 = 0x02;
/// Descriptor type: string (`USB_DT_STRING`).
pub const DT_STRING: u8 = 0x03;
/// Descriptor type: interface (`USB_DT_INTERFACE`).
pub const DT_INTERFACE: u8 = 0x04;
/// Descriptor type: endpoint (`USB_DT_ENDPOINT`).
pub const DT_ENDPOINT: u8 = 0x05;
/// Descriptor type: device qualifier (`USB_DT_DEVICE_QUALIFIER`).
pub const DT_DEVICE_QUALIFIER: u8 = 0x06;
/// HID class descriptor type (`HID_DT_HID`).
pub const DT_HID: u8 = 0x21;
/// HID report descriptor type (`HID_DT_REPORT`).
pub const DT_REPORT: u8 = 0x22;

/// Standard request: `GET_STATUS`.
pub const REQ_GET_STATUS: u8 = 0x00;
/// Standard request: `CLEAR_FEATURE`.
pub const REQ_CLEAR_FEATURE: u8 = 0x01;
/// Standard request: `SET_FEATURE`.
pub const REQ_SET_FEATURE: u8 = 0x03;
/// Standard request: `SET_ADDRESS`.
pub const REQ_SET_ADDRESS: u8 = 0x05;
/// Standard request: `GET_DESCRIPTOR`.
pub const REQ_GET_DESCRIPTOR: u8 = 0x06;
/// Standard request: `GET_CONFIGURATION`.
pub const REQ_GET_CONFIGURATION: u8 = 0x08;
/// Standard request: `SET_CONFIGURATION`.
pub const REQ_SET_CONFIGURATION: u8 = 0x09;
/// Standard request: `GET_INTERFACE`.
pub const REQ_GET_INTERFACE: u8 = 0x0A;
/// Standard request: `SET_INTERFACE`.
pub const REQ_SET_INTERFACE: u8 = 0x0B;

/// HID class request: `GET_REPORT`.
pub const HID_REQ_GET_REPORT: u8 = 0x01;
/// HID class request: `GET_IDLE`.
pub const HID_REQ_GET_IDLE: u8 = 0x02;
/// HID class request: `GET_PROTOCOL`.
pub const HID_REQ_GET_PROTOCOL: u8 = 0x03;
/// HID class request: `SET_REPORT`.
pub const HID_REQ_SET_REPORT: u8 = 0x09;
/// HID class request: `SET_IDLE`.
pub const HID_REQ_SET_IDLE: u8 = 0x0A;
/// HID class request: `SET_PROTOCOL`.
pub const HID_REQ_SET_PROTOCOL: u8 = 0x0B;

/// bmRequestType direction bit (`USB_DIR_IN`); clear means host-to-device.
pub const DIR_IN: u8 = 0x80;
/// bmRequestType type field mask (`USB_TYPE_MASK`).
pub const TYPE_MASK: u8 = 0x60;
/// bmRequestType type field: standard.
pub const TYPE_STANDARD: u8 = 0x00;
/// bmRequestType type field: class.
pub const TYPE_CLASS: u8 = 0x20;
/// bmRequestType type field: vendor.
pub const TYPE_VENDOR: u8 = 0x40;
/// bmRequestType recipient field mask.
pub const RECIPIENT_MASK: u8 = 0x1F;

/// Interface class: HID (`USB_CLASS_HID`).
pub const CLASS_HID: u8 = 0x03;
/// HID interface subclass: boot.
pub const HID_SUBCLASS_BOOT: u8 = 0x01;
/// HID interface protocol: keyboard (1); tablets report it for boot compat.
pub const HID_PROTOCOL_KEYBOARD: u8 = 0x01;

/// Endpoint transfer type: control.
pub const ENDPOINT_XFER_CONTROL: u8 = 0x00;
/// Endpoint transfer type: isochronous.
pub const ENDPOINT_XFER_ISOC: u8 = 0x01;
/// Endpoint transfer type: bulk.
pub const ENDPOINT_XFER_BULK: u8 = 0x02;
/// Endpoint transfer type: interrupt.
pub const ENDPOINT_XFER_INT: u8 = 0x03;
/// Endpoint address mask for the endpoint number.
pub const ENDPOINT_NUM_MASK: u8 = 0x0F;

/// Configuration bmAttributes: bit 7, always one.
pub const CONFIG_ATT_ONE: u8 = 0x80;
/// Configuration bmAttributes: self-powered.
pub const CONFIG_ATT_SELFPOWER: u8 = 0x40;
