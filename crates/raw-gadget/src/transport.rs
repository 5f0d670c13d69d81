//! The gadget transport trait, the `/dev/raw-gadget` implementation, and
//! an in-memory mock for driving protocol logic in tests.

use crate::caps::EndpointCaps;
use crate::{GadgetError, GadgetResult, EP0_MAX_DATA};

/// Connection speed requested from the UDC at init time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Speed {
    Low = 1,
    Full = 2,
    #[default]
    High = 3,
    Super = 5,
}

/// Handle to an enabled endpoint, as returned by the kernel; only valid
/// for I/O on the transport that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EpHandle(pub u16);

/// One event delivered by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GadgetEvent {
    /// The host connected; endpoint capabilities are now available.
    Connect,
    /// A SETUP packet arrived on endpoint 0.
    Control([u8; 8]),
    /// An event type this crate does not model.
    Unknown(u32),
}

/// Device-side call contract of the raw-gadget kernel transport.
///
/// Every method blocks without timeout, mirroring the kernel interface.
/// Implementations must be shareable across threads: the control loop and
/// the report streamer issue calls concurrently.
pub trait GadgetTransport: Send + Sync {
    /// Block until the next connect/control event.
    fn fetch_event(&self) -> GadgetResult<GadgetEvent>;

    /// Hardware endpoint capabilities for the current connection.
    fn eps_info(&self) -> GadgetResult<Vec<EndpointCaps>>;

    /// Send `data` to the host on endpoint 0 (IN data stage or status).
    fn ep0_write(&self, data: &[u8]) -> GadgetResult<usize>;

    /// Receive up to `buf.len()` bytes from the host on endpoint 0.
    fn ep0_read(&self, buf: &mut [u8]) -> GadgetResult<usize>;

    /// Stall endpoint 0, rejecting the current control transfer.
    fn ep0_stall(&self) -> GadgetResult<()>;

    /// Enable an endpoint described by the 7-byte wire descriptor and
    /// return its I/O handle.
    fn ep_enable(&self, descriptor: &[u8; 7]) -> GadgetResult<EpHandle>;

    /// Disable a previously enabled endpoint.
    fn ep_disable(&self, ep: EpHandle) -> GadgetResult<()>;

    /// Blocking write on an enabled endpoint.
    fn ep_write(&self, ep: EpHandle, data: &[u8]) -> GadgetResult<usize>;

    /// Declare the configuration's bus power draw (2 mA units).
    fn vbus_draw(&self, power: u8) -> GadgetResult<()>;

    /// Report the SET_CONFIGURATION transition to the UDC.
    fn configure(&self) -> GadgetResult<()>;
}

#[cfg(target_os = "linux")]
pub use real::RawGadget;

#[cfg(target_os = "linux")]
mod real {
    use super::*;
    use crate::sys;
    use std::fs::{File, OpenOptions};
    use std::io;
    use std::os::fd::AsRawFd;
    use tracing::{debug, trace};

    /// The kernel raw-gadget transport.
    #[derive(Debug)]
    pub struct RawGadget {
        file: File,
    }

    impl RawGadget {
        /// Default character device path.
        pub const DEFAULT_PATH: &'static str = "/dev/raw-gadget";

        /// Open the default raw-gadget device.
        ///
        /// # Errors
        ///
        /// Returns [`GadgetError::Open`] when the device node is missing
        /// or inaccessible (no raw_gadget module, no permissions).
        pub fn open() -> GadgetResult<Self> {
            Self::open_at(Self::DEFAULT_PATH)
        }

        /// Open a raw-gadget device at a non-default path.
        ///
        /// # Errors
        ///
        /// Returns [`GadgetError::Open`] when opening fails.
        pub fn open_at(path: &str) -> GadgetResult<Self> {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .open(path)
                .map_err(|source| GadgetError::Open {
                    path: path.to_owned(),
                    source,
                })?;
            Ok(Self { file })
        }

        /// Bind to a UDC and pick the connection speed.
        ///
        /// # Errors
        ///
        /// Returns [`GadgetError::NameTooLong`] if a name does not fit the
        /// kernel's 128-byte field (NUL included), or [`GadgetError::Ioctl`]
        /// if the UDC rejects the binding.
        pub fn init(&self, driver: &str, device: &str, speed: Speed) -> GadgetResult<()> {
            let mut arg = sys::RawInit {
                driver_name: [0; sys::UDC_NAME_LENGTH_MAX],
                device_name: [0; sys::UDC_NAME_LENGTH_MAX],
                speed: speed as u8,
            };
            pack_name(&mut arg.driver_name, driver)?;
            pack_name(&mut arg.device_name, device)?;
            debug!(driver, device, ?speed, "binding to UDC");
            self.ioctl("USB_RAW_IOCTL_INIT", sys::USB_RAW_IOCTL_INIT, &mut arg)?;
            Ok(())
        }

        /// Start event delivery. Call once after [`Self::init`].
        ///
        /// # Errors
        ///
        /// Returns [`GadgetError::Ioctl`] if the gadget cannot start.
        pub fn run(&self) -> GadgetResult<()> {
            self.ioctl_val("USB_RAW_IOCTL_RUN", sys::USB_RAW_IOCTL_RUN, 0)?;
            Ok(())
        }

        fn ioctl<T>(&self, op: &'static str, request: u64, arg: &mut T) -> GadgetResult<i32> {
            // SAFETY: `arg` is a live, exclusively borrowed C-layout value
            // whose size matches what `request` encodes; the fd is owned by
            // `self.file` and stays open for the duration of the call.
            let rv = unsafe {
                libc::ioctl(
                    self.file.as_raw_fd(),
                    request as libc::c_ulong,
                    arg as *mut T,
                )
            };
            if rv < 0 {
                return Err(GadgetError::Ioctl {
                    op,
                    source: io::Error::last_os_error(),
                });
            }
            Ok(rv)
        }

        /// For requests whose argument is a scalar carried in the ioctl
        /// call itself (RUN, EP_DISABLE, VBUS_DRAW, ...), not a pointer.
        fn ioctl_val(&self, op: &'static str, request: u64, arg: libc::c_ulong) -> GadgetResult<i32> {
            // SAFETY: `request` is one of the value-argument raw-gadget
            // ioctls, so the kernel never dereferences `arg`; the fd is
            // owned by `self.file` and stays open for the duration.
            let rv = unsafe { libc::ioctl(self.file.as_raw_fd(), request as libc::c_ulong, arg) };
            if rv < 0 {
                return Err(GadgetError::Ioctl {
                    op,
                    source: io::Error::last_os_error(),
                });
            }
            Ok(rv)
        }

        fn ep_io(
            &self,
            op: &'static str,
            request: u64,
            ep: u16,
            data: &[u8],
        ) -> GadgetResult<sys::RawEpIo> {
            if data.len() > EP0_MAX_DATA {
                return Err(GadgetError::PayloadTooLarge {
                    len: data.len(),
                    max: EP0_MAX_DATA,
                });
            }
            let mut io = sys::RawEpIo {
                ep,
                flags: 0,
                length: data.len() as u32,
                data: [0; EP0_MAX_DATA],
            };
            io.data[..data.len()].copy_from_slice(data);
            let transferred = self.ioctl(op, request, &mut io)?;
            trace!(op, ep, transferred, "endpoint I/O");
            io.length = transferred as u32;
            Ok(io)
        }
    }

    fn pack_name(field: &mut [u8; sys::UDC_NAME_LENGTH_MAX], name: &str) -> GadgetResult<()> {
        let bytes = name.as_bytes();
        if bytes.len() >= sys::UDC_NAME_LENGTH_MAX {
            return Err(GadgetError::NameTooLong {
                len: bytes.len(),
                max: sys::UDC_NAME_LENGTH_MAX - 1,
            });
        }
        field[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    impl GadgetTransport for RawGadget {
        fn fetch_event(&self) -> GadgetResult<GadgetEvent> {
            let mut event = sys::RawEventBuf {
                event_type: 0,
                length: 8,
                data: [0; 8],
            };
            self.ioctl(
                "USB_RAW_IOCTL_EVENT_FETCH",
                sys::USB_RAW_IOCTL_EVENT_FETCH,
                &mut event,
            )?;
            Ok(match event.event_type {
                sys::EVENT_CONNECT => GadgetEvent::Connect,
                sys::EVENT_CONTROL => GadgetEvent::Control(event.data),
                other => GadgetEvent::Unknown(other),
            })
        }

        fn eps_info(&self) -> GadgetResult<Vec<EndpointCaps>> {
            let mut info = sys::RawEpsInfo {
                eps: [sys::RawEpInfo::zeroed(); sys::EPS_NUM_MAX],
            };
            let count = self.ioctl(
                "USB_RAW_IOCTL_EPS_INFO",
                sys::USB_RAW_IOCTL_EPS_INFO,
                &mut info,
            )?;
            let count = (count as usize).min(sys::EPS_NUM_MAX);
            Ok(info.eps[..count].iter().map(crate::caps::from_raw).collect())
        }

        fn ep0_write(&self, data: &[u8]) -> GadgetResult<usize> {
            let io = self.ep_io("USB_RAW_IOCTL_EP0_WRITE", sys::USB_RAW_IOCTL_EP0_WRITE, 0, data)?;
            Ok(io.length as usize)
        }

        fn ep0_read(&self, buf: &mut [u8]) -> GadgetResult<usize> {
            let capacity = buf.len().min(EP0_MAX_DATA);
            let mut io = sys::RawEpIo {
                ep: 0,
                flags: 0,
                length: capacity as u32,
                data: [0; EP0_MAX_DATA],
            };
            let transferred =
                self.ioctl("USB_RAW_IOCTL_EP0_READ", sys::USB_RAW_IOCTL_EP0_READ, &mut io)?
                    as usize;
            let transferred = transferred.min(capacity);
            buf[..transferred].copy_from_slice(&io.data[..transferred]);
            Ok(transferred)
        }

        fn ep0_stall(&self) -> GadgetResult<()> {
            self.ioctl_val("USB_RAW_IOCTL_EP0_STALL", sys::USB_RAW_IOCTL_EP0_STALL, 0)?;
            Ok(())
        }

        fn ep_enable(&self, descriptor: &[u8; 7]) -> GadgetResult<EpHandle> {
            let mut desc = sys::EndpointDescriptorSys {
                length: descriptor[0],
                descriptor_type: descriptor[1],
                endpoint_address: descriptor[2],
                attributes: descriptor[3],
                max_packet_size: u16::from_le_bytes([descriptor[4], descriptor[5]]),
                interval: descriptor[6],
                refresh: 0,
                synch_address: 0,
            };
            let handle = self.ioctl(
                "USB_RAW_IOCTL_EP_ENABLE",
                sys::USB_RAW_IOCTL_EP_ENABLE,
                &mut desc,
            )?;
            debug!(handle, address = descriptor[2], "endpoint enabled");
            Ok(EpHandle(handle as u16))
        }

        fn ep_disable(&self, ep: EpHandle) -> GadgetResult<()> {
            self.ioctl_val(
                "USB_RAW_IOCTL_EP_DISABLE",
                sys::USB_RAW_IOCTL_EP_DISABLE,
                libc::c_ulong::from(ep.0),
            )?;
            Ok(())
        }

        fn ep_write(&self, ep: EpHandle, data: &[u8]) -> GadgetResult<usize> {
            let io = self.ep_io("USB_RAW_IOCTL_EP_WRITE", sys::USB_RAW_IOCTL_EP_WRITE, ep.0, data)?;
            Ok(io.length as usize)
        }

        fn vbus_draw(&self, power: u8) -> GadgetResult<()> {
            self.ioctl_val(
                "USB_RAW_IOCTL_VBUS_DRAW",
                sys::USB_RAW_IOCTL_VBUS_DRAW,
                libc::c_ulong::from(power),
            )?;
            Ok(())
        }

        fn configure(&self) -> GadgetResult<()> {
            self.ioctl_val("USB_RAW_IOCTL_CONFIGURE", sys::USB_RAW_IOCTL_CONFIGURE, 0)?;
            Ok(())
        }
    }
}

pub mod mock {
    //! Scripted in-memory transport for tests.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, Ordering};
    use std::sync::Mutex;

    /// A [`GadgetTransport`] whose events are scripted up front and whose
    /// writes are recorded for assertions.
    #[derive(Debug, Default)]
    pub struct MockTransport {
        events: Mutex<VecDeque<GadgetEvent>>,
        caps: Mutex<Vec<EndpointCaps>>,
        ep0_out_data: Mutex<VecDeque<Vec<u8>>>,
        ep0_read_lens: Mutex<Vec<usize>>,
        ep0_writes: Mutex<Vec<Vec<u8>>>,
        ep_writes: Mutex<Vec<(u16, Vec<u8>)>>,
        enabled: Mutex<Vec<[u8; 7]>>,
        stalls: AtomicU32,
        vbus_power: AtomicU32,
        configured: AtomicBool,
        next_handle: AtomicU16,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                next_handle: AtomicU16::new(1),
                ..Self::default()
            }
        }

        /// Queue an event for `fetch_event` to deliver.
        pub fn push_event(&self, event: GadgetEvent) {
            self.events
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push_back(event);
        }

        /// Queue a SETUP packet as a control event.
        pub fn push_control(&self, setup: [u8; 8]) {
            self.push_event(GadgetEvent::Control(setup));
        }

        /// Set the capability list `eps_info` reports.
        pub fn set_caps(&self, caps: Vec<EndpointCaps>) {
            *self.caps.lock().unwrap_or_else(|e| e.into_inner()) = caps;
        }

        /// Queue host OUT data for a future `ep0_read`.
        pub fn queue_ep0_out(&self, data: Vec<u8>) {
            self.ep0_out_data
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push_back(data);
        }

        /// Capacity of every `ep0_read` issued, in order. The device side
        /// decides how much of an OUT data stage it accepts, so the
        /// requested size is itself protocol-visible.
        pub fn ep0_read_lens(&self) -> Vec<usize> {
            self.ep0_read_lens
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }

        /// Everything written to the host on endpoint 0, in order.
        pub fn ep0_written(&self) -> Vec<Vec<u8>> {
            self.ep0_writes
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }

        /// Everything written on non-control endpoints, in order.
        pub fn ep_written(&self) -> Vec<(u16, Vec<u8>)> {
            self.ep_writes
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }

        /// Wire descriptors of the endpoints enabled so far.
        pub fn enabled_endpoints(&self) -> Vec<[u8; 7]> {
            self.enabled
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }

        /// Number of times endpoint 0 was stalled.
        pub fn stall_count(&self) -> u32 {
            self.stalls.load(Ordering::SeqCst)
        }

        /// Last declared vbus power draw (2 mA units).
        pub fn vbus_power(&self) -> u32 {
            self.vbus_power.load(Ordering::SeqCst)
        }

        /// Whether `configure` has been called.
        pub fn is_configured(&self) -> bool {
            self.configured.load(Ordering::SeqCst)
        }
    }

    impl GadgetTransport for MockTransport {
        fn fetch_event(&self) -> GadgetResult<GadgetEvent> {
            self.events
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front()
                .ok_or(GadgetError::Disconnected)
        }

        fn eps_info(&self) -> GadgetResult<Vec<EndpointCaps>> {
            Ok(self.caps.lock().unwrap_or_else(|e| e.into_inner()).clone())
        }

        fn ep0_write(&self, data: &[u8]) -> GadgetResult<usize> {
            if data.len() > EP0_MAX_DATA {
                return Err(GadgetError::PayloadTooLarge {
                    len: data.len(),
                    max: EP0_MAX_DATA,
                });
            }
            self.ep0_writes
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(data.to_vec());
            Ok(data.len())
        }

        fn ep0_read(&self, buf: &mut [u8]) -> GadgetResult<usize> {
            self.ep0_read_lens
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(buf.len());
            let data = self
                .ep0_out_data
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front()
                .unwrap_or_default();
            let n = data.len().min(buf.len());
            buf[..n].copy_from_slice(&data[..n]);
            Ok(n)
        }

        fn ep0_stall(&self) -> GadgetResult<()> {
            self.stalls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn ep_enable(&self, descriptor: &[u8; 7]) -> GadgetResult<EpHandle> {
            self.enabled
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(*descriptor);
            Ok(EpHandle(self.next_handle.fetch_add(1, Ordering::SeqCst)))
        }

        fn ep_disable(&self, _ep: EpHandle) -> GadgetResult<()> {
            Ok(())
        }

        fn ep_write(&self, ep: EpHandle, data: &[u8]) -> GadgetResult<usize> {
            if data.len() > EP0_MAX_DATA {
                return Err(GadgetError::PayloadTooLarge {
                    len: data.len(),
                    max: EP0_MAX_DATA,
                });
            }
            self.ep_writes
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push((ep.0, data.to_vec()));
            Ok(data.len())
        }

        fn vbus_draw(&self, power: u8) -> GadgetResult<()> {
            self.vbus_power.store(u32::from(power), Ordering::SeqCst);
            Ok(())
        }

        fn configure(&self) -> GadgetResult<()> {
            self.configured.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

}
