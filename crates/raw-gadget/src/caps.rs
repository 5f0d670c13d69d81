//! Hardware endpoint capability records reported by the UDC.
//!
//! One record per hardware endpoint, valid for the life of a single
//! connection. The negotiator matches the device's logical endpoints
//! against these.

/// Address value meaning "this endpoint can take any number"
/// (`USB_RAW_EP_ADDR_ANY`).
pub const EP_ADDR_ANY: u32 = 0xFF;

/// Capabilities of one hardware endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EndpointCaps {
    /// UDC-assigned endpoint name (e.g. `ep1in`, `ep-a`).
    pub name: String,
    /// Fixed endpoint number, or `None` when the hardware accepts any.
    pub fixed_addr: Option<u8>,
    /// Supports control transfers.
    pub control: bool,
    /// Supports isochronous transfers.
    pub iso: bool,
    /// Supports bulk transfers.
    pub bulk: bool,
    /// Supports interrupt transfers.
    pub interrupt: bool,
    /// Supports the IN (device-to-host) direction.
    pub dir_in: bool,
    /// Supports the OUT (host-to-device) direction.
    pub dir_out: bool,
    /// Largest packet the hardware moves on this endpoint.
    pub maxpacket_limit: u16,
    /// Stream count for SuperSpeed bulk endpoints (0 otherwise).
    pub max_streams: u16,
}

impl EndpointCaps {
    /// A typical dual-direction interrupt/bulk-capable endpoint with no
    /// fixed number, as dummy_hcd reports them. Test helper.
    pub fn any_direction_any_type(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            fixed_addr: None,
            control: false,
            iso: true,
            bulk: true,
            interrupt: true,
            dir_in: true,
            dir_out: true,
            maxpacket_limit: 1024,
            max_streams: 0,
        }
    }

    /// Bulk-only OUT endpoint. Test helper for negotiation misses.
    pub fn bulk_out_only(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            fixed_addr: None,
            bulk: true,
            dir_out: true,
            maxpacket_limit: 512,
            ..Self::default()
        }
    }
}

#[cfg(target_os = "linux")]
pub(crate) fn from_raw(info: &crate::sys::RawEpInfo) -> EndpointCaps {
    let name_len = info.name.iter().position(|&b| b == 0).unwrap_or(info.name.len());
    let caps = info.caps;
    EndpointCaps {
        name: String::from_utf8_lossy(&info.name[..name_len]).into_owned(),
        fixed_addr: if info.addr == EP_ADDR_ANY {
            None
        } else {
            Some(info.addr as u8)
        },
        control: caps & (1 << 0) != 0,
        iso: caps & (1 << 1) != 0,
        bulk: caps & (1 << 2) != 0,
        interrupt: caps & (1 << 3) != 0,
        dir_in: caps & (1 << 4) != 0,
        dir_out: caps & (1 << 5) != 0,
        maxpacket_limit: info.maxpacket_limit,
        max_streams: info.max_streams,
    }
}
