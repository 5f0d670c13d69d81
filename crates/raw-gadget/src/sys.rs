//! raw-gadget uapi: C struct mirrors and ioctl request codes.
//!
//! Request codes follow the asm-generic `_IOC` encoding with magic `'U'`;
//! sizes are the C `sizeof` of the argument type, which for the
//! flexible-array structs (`usb_raw_event`, `usb_raw_ep_io`) is the
//! header alone.

use std::mem::size_of;

pub(crate) const UDC_NAME_LENGTH_MAX: usize = 128;
pub(crate) const EPS_NUM_MAX: usize = 30;
pub(crate) const EP_NAME_MAX: usize = 16;

/// Argument of `USB_RAW_IOCTL_INIT`.
#[repr(C)]
pub(crate) struct RawInit {
    pub driver_name: [u8; UDC_NAME_LENGTH_MAX],
    pub device_name: [u8; UDC_NAME_LENGTH_MAX],
    pub speed: u8,
}

/// Header of `struct usb_raw_event`; the ioctl size covers this alone.
#[repr(C)]
pub(crate) struct RawEventHeader {
    pub event_type: u32,
    pub length: u32,
}

/// Event buffer with room for a SETUP packet behind the header.
#[repr(C)]
pub(crate) struct RawEventBuf {
    pub event_type: u32,
    pub length: u32,
    pub data: [u8; 8],
}

/// Header of `struct usb_raw_ep_io`.
#[repr(C)]
pub(crate) struct RawEpIoHeader {
    pub ep: u16,
    pub flags: u16,
    pub length: u32,
}

/// Endpoint I/O buffer sized for the control endpoint; smaller transfers
/// set `length` accordingly.
#[repr(C)]
pub(crate) struct RawEpIo {
    pub ep: u16,
    pub flags: u16,
    pub length: u32,
    pub data: [u8; crate::EP0_MAX_DATA],
}

/// Kernel `struct usb_endpoint_descriptor`: the 7 wire bytes plus the two
/// audio-only trailing fields.
#[repr(C, packed)]
pub(crate) struct EndpointDescriptorSys {
    pub length: u8,
    pub descriptor_type: u8,
    pub endpoint_address: u8,
    pub attributes: u8,
    pub max_packet_size: u16,
    pub interval: u8,
    pub refresh: u8,
    pub synch_address: u8,
}

/// One entry of `struct usb_raw_eps_info`.
#[repr(C)]
#[derive(Clone, Copy)]
pub(crate) struct RawEpInfo {
    pub name: [u8; EP_NAME_MAX],
    pub addr: u32,
    pub caps: u32,
    pub maxpacket_limit: u16,
    pub max_streams: u16,
    pub reserved: u32,
}

impl RawEpInfo {
    pub(crate) const fn zeroed() -> Self {
        Self {
            name: [0; EP_NAME_MAX],
            addr: 0,
            caps: 0,
            maxpacket_limit: 0,
            max_streams: 0,
            reserved: 0,
        }
    }
}

/// Argument of `USB_RAW_IOCTL_EPS_INFO`.
#[repr(C)]
pub(crate) struct RawEpsInfo {
    pub eps: [RawEpInfo; EPS_NUM_MAX],
}

// asm-generic ioctl encoding.
const IOC_NRSHIFT: u64 = 0;
const IOC_TYPESHIFT: u64 = 8;
const IOC_SIZESHIFT: u64 = 16;
const IOC_DIRSHIFT: u64 = 30;
const IOC_NONE: u64 = 0;
const IOC_WRITE: u64 = 1;
const IOC_READ: u64 = 2;

const URG_MAGIC: u64 = b'U' as u64;

const fn ioc(dir: u64, nr: u64, size: usize) -> u64 {
    (dir << IOC_DIRSHIFT)
        | ((size as u64) << IOC_SIZESHIFT)
        | (URG_MAGIC << IOC_TYPESHIFT)
        | (nr << IOC_NRSHIFT)
}

const fn io(nr: u64) -> u64 {
    ioc(IOC_NONE, nr, 0)
}

const fn ior(nr: u64, size: usize) -> u64 {
    ioc(IOC_READ, nr, size)
}

const fn iow(nr: u64, size: usize) -> u64 {
    ioc(IOC_WRITE, nr, size)
}

const fn iowr(nr: u64, size: usize) -> u64 {
    ioc(IOC_READ | IOC_WRITE, nr, size)
}

pub(crate) const USB_RAW_IOCTL_INIT: u64 = iow(0, size_of::<RawInit>());
pub(crate) const USB_RAW_IOCTL_RUN: u64 = io(1);
pub(crate) const USB_RAW_IOCTL_EVENT_FETCH: u64 = ior(2, size_of::<RawEventHeader>());
pub(crate) const USB_RAW_IOCTL_EP0_WRITE: u64 = iow(3, size_of::<RawEpIoHeader>());
pub(crate) const USB_RAW_IOCTL_EP0_READ: u64 = iowr(4, size_of::<RawEpIoHeader>());
pub(crate) const USB_RAW_IOCTL_EP_ENABLE: u64 = iow(5, size_of::<EndpointDescriptorSys>());
pub(crate) const USB_RAW_IOCTL_EP_DISABLE: u64 = iow(6, size_of::<u32>());
pub(crate) const USB_RAW_IOCTL_EP_WRITE: u64 = iow(7, size_of::<RawEpIoHeader>());
pub(crate) const USB_RAW_IOCTL_EP_READ: u64 = iowr(8, size_of::<RawEpIoHeader>());
pub(crate) const USB_RAW_IOCTL_CONFIGURE: u64 = io(9);
pub(crate) const USB_RAW_IOCTL_VBUS_DRAW: u64 = iow(10, size_of::<u32>());
pub(crate) const USB_RAW_IOCTL_EPS_INFO: u64 = ior(11, size_of::<RawEpsInfo>());
pub(crate) const USB_RAW_IOCTL_EP0_STALL: u64 = io(12);
pub(crate) const USB_RAW_IOCTL_EP_SET_HALT: u64 = iow(13, size_of::<u32>());

/// `USB_RAW_EVENT_CONNECT`.
pub(crate) const EVENT_CONNECT: u32 = 1;
/// `USB_RAW_EVENT_CONTROL`.
pub(crate) const EVENT_CONTROL: u32 = 2;
