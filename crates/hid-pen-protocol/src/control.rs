//! SETUP packet parsing for control transfers on endpoint 0.

use crate::usb;
use crate::{PenProtocolError, PenProtocolResult};

/// Transfer direction taken from the bmRequestType direction bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Device to host.
    In,
    /// Host to device.
    Out,
}

/// The bmRequestType type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Standard,
    Class,
    Vendor,
    /// The reserved type encoding (0b11).
    Reserved,
}

/// The bmRequestType recipient field (informational; this device only
/// logs it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Device,
    Interface,
    Endpoint,
    Other(u8),
}

/// One parsed 8-byte SETUP packet. Read-only for the life of the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRequest {
    pub request_type: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: u16,
}

impl ControlRequest {
    /// Wire size of a SETUP packet.
    pub const SIZE: usize = 8;

    /// Parse a SETUP packet from the start of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`PenProtocolError::TruncatedControlRequest`] if fewer than
    /// 8 bytes are available.
    pub fn parse(data: &[u8]) -> PenProtocolResult<Self> {
        if data.len() < Self::SIZE {
            return Err(PenProtocolError::TruncatedControlRequest { actual: data.len() });
        }
        Ok(Self {
            request_type: data[0],
            request: data[1],
            value: u16::from_le_bytes([data[2], data[3]]),
            index: u16::from_le_bytes([data[4], data[5]]),
            length: u16::from_le_bytes([data[6], data[7]]),
        })
    }

    /// Direction of the data stage.
    pub fn direction(&self) -> Direction {
        if self.request_type & usb::DIR_IN != 0 {
            Direction::In
        } else {
            Direction::Out
        }
    }

    /// Standard / class / vendor classification.
    pub fn kind(&self) -> RequestKind {
        match self.request_type & usb::TYPE_MASK {
            usb::TYPE_STANDARD => RequestKind::Standard,
            usb::TYPE_CLASS => RequestKind::Class,
            usb::TYPE_VENDOR => RequestKind::Vendor,
            _ => RequestKind::Reserved,
        }
    }

    /// Recipient field.
    pub fn recipient(&self) -> Recipient {
        match self.request_type & usb::RECIPIENT_MASK {
            0 => Recipient::Device,
            1 => Recipient::Interface,
            2 => Recipient::Endpoint,
            other => Recipient::Other(other),
        }
    }

    /// For GET_DESCRIPTOR: the descriptor type (wValue high byte).
    pub fn descriptor_type(&self) -> u8 {
        (self.value >> 8) as u8
    }

    /// For GET_DESCRIPTOR: the descriptor index (wValue low byte).
    pub fn descriptor_index(&self) -> u8 {
        (self.value & 0xFF) as u8
    }

    /// Human-readable request name for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self.kind() {
            RequestKind::Standard => match self.request {
                usb::REQ_GET_STATUS => "GET_STATUS",
                usb::REQ_CLEAR_FEATURE => "CLEAR_FEATURE",
                usb::REQ_SET_FEATURE => "SET_FEATURE",
                usb::REQ_SET_ADDRESS => "SET_ADDRESS",
                usb::REQ_GET_DESCRIPTOR => "GET_DESCRIPTOR",
                usb::REQ_GET_CONFIGURATION => "GET_CONFIGURATION",
                usb::REQ_SET_CONFIGURATION => "SET_CONFIGURATION",
                usb::REQ_GET_INTERFACE => "GET_INTERFACE",
                usb::REQ_SET_INTERFACE => "SET_INTERFACE",
                _ => "standard (unknown)",
            },
            RequestKind::Class => match self.request {
                usb::HID_REQ_GET_REPORT => "HID GET_REPORT",
                usb::HID_REQ_GET_IDLE => "HID GET_IDLE",
                usb::HID_REQ_GET_PROTOCOL => "HID GET_PROTOCOL",
                usb::HID_REQ_SET_REPORT => "HID SET_REPORT",
                usb::HID_REQ_SET_IDLE => "HID SET_IDLE",
                usb::HID_REQ_SET_PROTOCOL => "HID SET_PROTOCOL",
                _ => "class (unknown)",
            },
            RequestKind::Vendor => "vendor (unknown)",
            RequestKind::Reserved => "reserved type",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_get_descriptor_device() {
        // bmRequestType IN|standard|device, GET_DESCRIPTOR, device type,
        // index 0, wLength 64.
        let raw = [0x80, 0x06, 0x00, 0x01, 0x00, 0x00, 0x40, 0x00];
        let req = ControlRequest::parse(&raw).unwrap();
        assert_eq!(req.direction(), Direction::In);
        assert_eq!(req.kind(), RequestKind::Standard);
        assert_eq!(req.recipient(), Recipient::Device);
        assert_eq!(req.request, usb::REQ_GET_DESCRIPTOR);
        assert_eq!(req.descriptor_type(), usb::DT_DEVICE);
        assert_eq!(req.descriptor_index(), 0);
        assert_eq!(req.length, 64);
        assert_eq!(req.describe(), "GET_DESCRIPTOR");
    }

    #[test]
    fn parses_class_set_idle() {
        let raw = [0x21, 0x0A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let req = ControlRequest::parse(&raw).unwrap();
        assert_eq!(req.kind(), RequestKind::Class);
        assert_eq!(req.direction(), Direction::Out);
        assert_eq!(req.recipient(), Recipient::Interface);
        assert_eq!(req.describe(), "HID SET_IDLE");
    }

    #[test]
    fn reserved_type_bits_classify_as_reserved() {
        let raw = [0x60, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let req = ControlRequest::parse(&raw).unwrap();
        assert_eq!(req.kind(), RequestKind::Reserved);
    }

    #[test]
    fn truncated_setup_is_an_error() {
        assert_eq!(
            ControlRequest::parse(&[0x80, 0x06, 0x00]),
            Err(PenProtocolError::TruncatedControlRequest { actual: 3 })
        );
    }
}
