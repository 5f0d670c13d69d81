//! USB descriptor records and the configuration-chain builder.
//!
//! Each descriptor is a plain record with an explicit little-endian
//! `encode_into`, so the wire layout is visible field-by-field instead of
//! hiding behind packed-struct casts. [`DescriptorSet`] bundles the full
//! chain for one device instance; the endpoint descriptor inside it is the
//! single mutable spot — its address starts unassigned and is written once
//! by endpoint negotiation.

use crate::ids;
use crate::usb;
use crate::{PenProtocolError, PenProtocolResult};

/// HID report descriptor for the pen: one application collection (report
/// id 6) with six switch bits, two constant padding bits, 16-bit X/Y in
/// centimeter units and 16-bit tip pressure.
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x0D, // Usage Page (Digitizer)
    0x09, 0x02, // Usage (Pen)
    0xA1, 0x01, // Collection (Application)
    0x85, 0x06, //     Report ID (6)
    0x09, 0x20, //     Usage (Stylus)
    0xA0, //           Collection (Physical)
    0x09, 0x42, //         Usage (Tip Switch)
    0x09, 0x44, //         Usage (Barrel Switch)
    0x09, 0x45, //         Usage (Eraser)
    0x09, 0x3C, //         Usage (Invert)
    0x08, //               Usage (00h)
    0x09, 0x32, //         Usage (In Range)
    0x14, //               Logical Minimum (0)
    0x25, 0x01, //         Logical Maximum (1)
    0x75, 0x01, //         Report Size (1)
    0x95, 0x06, //         Report Count (6)
    0x81, 0x02, //         Input (Variable)
    0x95, 0x02, //         Report Count (2)
    0x81, 0x03, //         Input (Constant, Variable)
    0x05, 0x01, //         Usage Page (Desktop)
    0x09, 0x30, //         Usage (X)
    0x26, 0x80, 0x3E, //   Logical Maximum (16000)
    0x46, 0x80, 0x3E, //   Physical Maximum (16000)
    0x65, 0x11, //         Unit (Centimeter)
    0x55, 0x0D, //         Unit Exponent (13)
    0x75, 0x10, //         Report Size (16)
    0x95, 0x01, //         Report Count (1)
    0x81, 0x02, //         Input (Variable)
    0x09, 0x31, //         Usage (Y)
    0x26, 0x28, 0x23, //   Logical Maximum (9000)
    0x46, 0x28, 0x23, //   Physical Maximum (9000)
    0x81, 0x02, //         Input (Variable)
    0x44, //               Physical Maximum (0)
    0x64, //               Unit
    0x54, //               Unit Exponent (0)
    0x05, 0x0D, //         Usage Page (Digitizer)
    0x09, 0x30, //         Usage (Tip Pressure)
    0x26, 0xFF, 0x03, //   Logical Maximum (1023)
    0x75, 0x10, //         Report Size (16)
    0x81, 0x02, //         Input (Variable)
    0xC0, //           End Collection
    0xC0, // End Collection
];

/// Bounded little-endian writer over a caller-supplied buffer.
struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn ensure(&self, extra: usize) -> PenProtocolResult<()> {
        let needed = self.pos + extra;
        if needed > self.buf.len() {
            return Err(PenProtocolError::BufferTooSmall {
                needed,
                capacity: self.buf.len(),
            });
        }
        Ok(())
    }

    fn put_u8(&mut self, value: u8) -> PenProtocolResult<()> {
        self.ensure(1)?;
        self.buf[self.pos] = value;
        self.pos += 1;
        Ok(())
    }

    fn put_u16_le(&mut self, value: u16) -> PenProtocolResult<()> {
        self.ensure(2)?;
        self.buf[self.pos..self.pos + 2].copy_from_slice(&value.to_le_bytes());
        self.pos += 2;
        Ok(())
    }

    fn written(&self) -> usize {
        self.pos
    }
}

/// Standard device descriptor (18 bytes on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub bcd_usb: u16,
    pub device_class: u8,
    pub device_subclass: u8,
    pub device_protocol: u8,
    pub max_packet_size0: u8,
    pub vendor_id: u16,
    pub product_id: u16,
    pub bcd_device: u16,
    pub manufacturer_index: u8,
    pub product_index: u8,
    pub serial_index: u8,
    pub num_configurations: u8,
}

impl DeviceDescriptor {
    /// Encoded size in bytes.
    pub const SIZE: usize = 18;

    /// The software tablet's identity.
    pub fn tablet() -> Self {
        Self {
            bcd_usb: ids::BCD_USB,
            device_class: 0,
            device_subclass: 0,
            device_protocol: 0,
            max_packet_size0: ids::EP0_MAX_PACKET,
            vendor_id: ids::VENDOR_ID,
            product_id: ids::PRODUCT_ID,
            bcd_device: ids::BCD_DEVICE,
            manufacturer_index: ids::STRING_ID_MANUFACTURER,
            product_index: ids::STRING_ID_PRODUCT,
            serial_index: ids::STRING_ID_SERIAL,
            num_configurations: 1,
        }
    }

    /// Serialize into `buf`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`PenProtocolError::BufferTooSmall`] if `buf` is shorter
    /// than [`Self::SIZE`]; nothing is written in that case.
    pub fn encode_into(&self, buf: &mut [u8]) -> PenProtocolResult<usize> {
        if buf.len() < Self::SIZE {
            return Err(PenProtocolError::BufferTooSmall {
                needed: Self::SIZE,
                capacity: buf.len(),
            });
        }
        let mut w = Writer::new(buf);
        w.put_u8(Self::SIZE as u8)?;
        w.put_u8(usb::DT_DEVICE)?;
        w.put_u16_le(self.bcd_usb)?;
        w.put_u8(self.device_class)?;
        w.put_u8(self.device_subclass)?;
        w.put_u8(self.device_protocol)?;
        w.put_u8(self.max_packet_size0)?;
        w.put_u16_le(self.vendor_id)?;
        w.put_u16_le(self.product_id)?;
        w.put_u16_le(self.bcd_device)?;
        w.put_u8(self.manufacturer_index)?;
        w.put_u8(self.product_index)?;
        w.put_u8(self.serial_index)?;
        w.put_u8(self.num_configurations)?;
        Ok(w.written())
    }
}

/// Device qualifier descriptor (10 bytes): what the device would look like
/// at the other speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceQualifierDescriptor {
    pub bcd_usb: u16,
    pub device_class: u8,
    pub device_subclass: u8,
    pub device_protocol: u8,
    pub max_packet_size0: u8,
    pub num_configurations: u8,
}

impl DeviceQualifierDescriptor {
    /// Encoded size in bytes.
    pub const SIZE: usize = 10;

    /// Qualifier matching [`DeviceDescriptor::tablet`].
    pub fn tablet() -> Self {
        Self {
            bcd_usb: ids::BCD_USB,
            device_class: 0,
            device_subclass: 0,
            device_protocol: 0,
            max_packet_size0: ids::EP0_MAX_PACKET,
            num_configurations: 1,
        }
    }

    /// Serialize into `buf`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`PenProtocolError::BufferTooSmall`] if `buf` is shorter
    /// than [`Self::SIZE`].
    pub fn encode_into(&self, buf: &mut [u8]) -> PenProtocolResult<usize> {
        if buf.len() < Self::SIZE {
            return Err(PenProtocolError::BufferTooSmall {
                needed: Self::SIZE,
                capacity: buf.len(),
            });
        }
        let mut w = Writer::new(buf);
        w.put_u8(Self::SIZE as u8)?;
        w.put_u8(usb::DT_DEVICE_QUALIFIER)?;
        w.put_u16_le(self.bcd_usb)?;
        w.put_u8(self.device_class)?;
        w.put_u8(self.device_subclass)?;
        w.put_u8(self.device_protocol)?;
        w.put_u8(self.max_packet_size0)?;
        w.put_u8(self.num_configurations)?;
        w.put_u8(0)?; // bRESERVED
        Ok(w.written())
    }
}

/// Configuration descriptor header (9 bytes). `total_length` is 0 until
/// the chain builder patches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurationDescriptor {
    pub total_length: u16,
    pub num_interfaces: u8,
    pub configuration_value: u8,
    pub configuration_index: u8,
    pub attributes: u8,
    pub max_power: u8,
}

impl ConfigurationDescriptor {
    /// Encoded size of the header itself in bytes.
    pub const SIZE: usize = 9;
    /// Byte offset of the wTotalLength field within the encoding.
    pub const TOTAL_LENGTH_OFFSET: usize = 2;

    /// The tablet's single self-powered configuration.
    pub fn tablet() -> Self {
        Self {
            total_length: 0, // patched by build_configuration
            num_interfaces: 1,
            configuration_value: 1,
            configuration_index: ids::STRING_ID_CONFIG,
            attributes: usb::CONFIG_ATT_ONE | usb::CONFIG_ATT_SELFPOWER,
            max_power: ids::MAX_POWER,
        }
    }

    /// Serialize into `buf`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`PenProtocolError::BufferTooSmall`] if `buf` is shorter
    /// than [`Self::SIZE`].
    pub fn encode_into(&self, buf: &mut [u8]) -> PenProtocolResult<usize> {
        if buf.len() < Self::SIZE {
            return Err(PenProtocolError::BufferTooSmall {
                needed: Self::SIZE,
                capacity: buf.len(),
            });
        }
        let mut w = Writer::new(buf);
        w.put_u8(Self::SIZE as u8)?;
        w.put_u8(usb::DT_CONFIG)?;
        w.put_u16_le(self.total_length)?;
        w.put_u8(self.num_interfaces)?;
        w.put_u8(self.configuration_value)?;
        w.put_u8(self.configuration_index)?;
        w.put_u8(self.attributes)?;
        w.put_u8(self.max_power)?;
        Ok(w.written())
    }
}

/// Interface descriptor (9 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    pub interface_number: u8,
    pub alternate_setting: u8,
    pub num_endpoints: u8,
    pub interface_class: u8,
    pub interface_subclass: u8,
    pub interface_protocol: u8,
    pub interface_index: u8,
}

impl InterfaceDescriptor {
    /// Encoded size in bytes.
    pub const SIZE: usize = 9;

    /// The tablet's single HID boot interface.
    pub fn tablet() -> Self {
        Self {
            interface_number: 0,
            alternate_setting: 0,
            num_endpoints: 1,
            interface_class: usb::CLASS_HID,
            interface_subclass: usb::HID_SUBCLASS_BOOT,
            interface_protocol: usb::HID_PROTOCOL_KEYBOARD,
            interface_index: ids::STRING_ID_INTERFACE,
        }
    }

    /// Serialize into `buf`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`PenProtocolError::BufferTooSmall`] if `buf` is shorter
    /// than [`Self::SIZE`].
    pub fn encode_into(&self, buf: &mut [u8]) -> PenProtocolResult<usize> {
        if buf.len() < Self::SIZE {
            return Err(PenProtocolError::BufferTooSmall {
                needed: Self::SIZE,
                capacity: buf.len(),
            });
        }
        let mut w = Writer::new(buf);
        w.put_u8(Self::SIZE as u8)?;
        w.put_u8(usb::DT_INTERFACE)?;
        w.put_u8(self.interface_number)?;
        w.put_u8(self.alternate_setting)?;
        w.put_u8(self.num_endpoints)?;
        w.put_u8(self.interface_class)?;
        w.put_u8(self.interface_subclass)?;
        w.put_u8(self.interface_protocol)?;
        w.put_u8(self.interface_index)?;
        Ok(w.written())
    }
}

/// HID class descriptor (9 bytes): version, country code, and the length
/// of the one report descriptor that follows on request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HidDescriptor {
    pub bcd_hid: u16,
    pub country_code: u8,
    pub report_descriptor_len: u16,
}

impl HidDescriptor {
    /// Encoded size in bytes.
    pub const SIZE: usize = 9;

    /// HID descriptor advertising [`REPORT_DESCRIPTOR`].
    pub fn tablet() -> Self {
        Self {
            bcd_hid: ids::BCD_HID,
            country_code: 0,
            report_descriptor_len: REPORT_DESCRIPTOR.len() as u16,
        }
    }

    /// Serialize into `buf`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`PenProtocolError::BufferTooSmall`] if `buf` is shorter
    /// than [`Self::SIZE`].
    pub fn encode_into(&self, buf: &mut [u8]) -> PenProtocolResult<usize> {
        if buf.len() < Self::SIZE {
            return Err(PenProtocolError::BufferTooSmall {
                needed: Self::SIZE,
                capacity: buf.len(),
            });
        }
        let mut w = Writer::new(buf);
        w.put_u8(Self::SIZE as u8)?;
        w.put_u8(usb::DT_HID)?;
        w.put_u16_le(self.bcd_hid)?;
        w.put_u8(self.country_code)?;
        w.put_u8(1)?; // bNumDescriptors
        w.put_u8(usb::DT_REPORT)?;
        w.put_u16_le(self.report_descriptor_len)?;
        Ok(w.written())
    }
}

/// Endpoint descriptor (7 bytes). The endpoint number inside `address`
/// is 0 (unassigned) until negotiation writes it exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub address: u8,
    pub attributes: u8,
    pub max_packet_size: u16,
    pub interval: u8,
}

impl EndpointDescriptor {
    /// Encoded size in bytes.
    pub const SIZE: usize = 7;

    /// The tablet's interrupt-IN report endpoint, address unassigned.
    pub fn interrupt_in() -> Self {
        Self {
            address: usb::DIR_IN,
            attributes: usb::ENDPOINT_XFER_INT,
            max_packet_size: ids::INT_MAX_PACKET,
            interval: ids::INT_INTERVAL,
        }
    }

    /// Endpoint number portion of the address (0 = unassigned).
    pub fn number(&self) -> u8 {
        self.address & usb::ENDPOINT_NUM_MASK
    }

    /// Whether negotiation has assigned an endpoint number yet.
    pub fn is_assigned(&self) -> bool {
        self.number() != 0
    }

    /// Whether the descriptor's direction bit is device-to-host.
    pub fn is_in(&self) -> bool {
        self.address & usb::DIR_IN != 0
    }

    /// Transfer type from the attributes field.
    pub fn transfer_type(&self) -> u8 {
        self.attributes & 0x03
    }

    /// Record the negotiated endpoint number, keeping the direction bit.
    pub fn assign(&mut self, number: u8) {
        self.address = (self.address & !usb::ENDPOINT_NUM_MASK) | (number & usb::ENDPOINT_NUM_MASK);
    }

    /// Serialize into `buf`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`PenProtocolError::BufferTooSmall`] if `buf` is shorter
    /// than [`Self::SIZE`].
    pub fn encode_into(&self, buf: &mut [u8]) -> PenProtocolResult<usize> {
        if buf.len() < Self::SIZE {
            return Err(PenProtocolError::BufferTooSmall {
                needed: Self::SIZE,
                capacity: buf.len(),
            });
        }
        let mut w = Writer::new(buf);
        w.put_u8(Self::SIZE as u8)?;
        w.put_u8(usb::DT_ENDPOINT)?;
        w.put_u8(self.address)?;
        w.put_u8(self.attributes)?;
        w.put_u16_le(self.max_packet_size)?;
        w.put_u8(self.interval)?;
        Ok(w.written())
    }

    /// Serialize to a fixed array (infallible convenience for transports).
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let [size_lo, size_hi] = self.max_packet_size.to_le_bytes();
        [
            Self::SIZE as u8,
            usb::DT_ENDPOINT,
            self.address,
            self.attributes,
            size_lo,
            size_hi,
            self.interval,
        ]
    }
}

/// The full descriptor chain for one device instance.
///
/// Built once per connection; the only field mutated afterwards is the
/// endpoint address, written exactly once by endpoint negotiation.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorSet {
    pub device: DeviceDescriptor,
    pub qualifier: DeviceQualifierDescriptor,
    pub configuration: ConfigurationDescriptor,
    pub interface: InterfaceDescriptor,
    pub hid: HidDescriptor,
    pub endpoint: EndpointDescriptor,
}

impl DescriptorSet {
    /// Total encoded size of the configuration chain.
    pub const CONFIGURATION_CHAIN_SIZE: usize = ConfigurationDescriptor::SIZE
        + InterfaceDescriptor::SIZE
        + HidDescriptor::SIZE
        + EndpointDescriptor::SIZE;

    /// Descriptor set for the software tablet.
    pub fn tablet() -> Self {
        Self {
            device: DeviceDescriptor::tablet(),
            qualifier: DeviceQualifierDescriptor::tablet(),
            configuration: ConfigurationDescriptor::tablet(),
            interface: InterfaceDescriptor::tablet(),
            hid: HidDescriptor::tablet(),
            endpoint: EndpointDescriptor::interrupt_in(),
        }
    }

    /// Concatenate configuration, interface, HID and endpoint descriptors
    /// into `buf` and back-patch the configuration header's wTotalLength
    /// with the number of bytes written. Returns that total.
    ///
    /// # Errors
    ///
    /// Returns [`PenProtocolError::BufferTooSmall`] if any sub-descriptor
    /// does not fit in the remaining capacity. Sub-descriptors are written
    /// whole or not at all, so a failed build never leaves a torn record
    /// at the point of failure.
    pub fn build_configuration(&self, buf: &mut [u8]) -> PenProtocolResult<usize> {
        let mut total = 0usize;
        total += self.configuration.encode_into(&mut buf[total..])?;
        total += self.interface.encode_into(&mut buf[total..])?;
        total += self.hid.encode_into(&mut buf[total..])?;
        total += self.endpoint.encode_into(&mut buf[total..])?;

        // wTotalLength is a forward reference: it cannot be known until
        // the last sub-descriptor has landed.
        let patch = ConfigurationDescriptor::TOTAL_LENGTH_OFFSET;
        buf[patch..patch + 2].copy_from_slice(&(total as u16).to_le_bytes());
        Ok(total)
    }
}
