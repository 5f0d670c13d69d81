//! Device identity: vendor/product ids, version numbers, fixed strings
//! and packet sizes.

/// Wacom Co., Ltd. USB vendor id.
pub const VENDOR_ID: u16 = 0x056A;
/// Product id used by the software tablet (outside Wacom's real range).
pub const PRODUCT_ID: u16 = 0xFFAB;

/// USB specification release, BCD (2.0).
pub const BCD_USB: u16 = 0x0200;
/// HID specification release, BCD (1.10).
pub const BCD_HID: u16 = 0x0110;
/// Device release number, BCD.
pub const BCD_DEVICE: u16 = 0x0000;

/// English (United States) language id.
pub const LANG_EN_US: u16 = 0x0409;

/// String descriptor index: manufacturer.
pub const STRING_ID_MANUFACTURER: u8 = 1;
/// String descriptor index: product.
pub const STRING_ID_PRODUCT: u8 = 2;
/// String descriptor index: serial number.
pub const STRING_ID_SERIAL: u8 = 3;
/// String descriptor index for the configuration (0 = none).
pub const STRING_ID_CONFIG: u8 = 0;
/// String descriptor index for the interface (0 = none).
pub const STRING_ID_INTERFACE: u8 = 0;

/// Manufacturer string (index 1, en-US).
pub const MANUFACTURER: &str = "Wacom Co., Ltd.";
/// Product string (index 2, en-US).
pub const PRODUCT: &str = "Software Tablet";
/// Serial number string (index 3, en-US).
pub const SERIAL: &str = "19830712";

/// Maximum packet size on endpoint 0.
pub const EP0_MAX_PACKET: u8 = 64;
/// Maximum packet size on the interrupt-IN endpoint.
pub const INT_MAX_PACKET: u16 = 8;
/// Polling interval for the interrupt-IN endpoint (frames).
pub const INT_INTERVAL: u8 = 5;

/// bMaxPower in the configuration descriptor (2 mA units; 0x32 = 100 mA).
pub const MAX_POWER: u8 = 0x32;
