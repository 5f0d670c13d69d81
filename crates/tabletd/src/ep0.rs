//! Control-transfer handling on endpoint 0.
//!
//! Each SETUP packet is decoded, executed for its side effects, and then
//! completed: IN requests write the prepared reply (truncated to wLength),
//! OUT requests read and discard the host's data stage. Requests outside
//! the device's protocol stall endpoint 0 and leave the device running.

use std::sync::Arc;

use hid_pen_protocol::{
    ids, string_descriptor, usb, ControlRequest, Direction, PenProtocolError, RequestKind,
    REPORT_DESCRIPTOR,
};
use softtablet_raw_gadget::{GadgetTransport, EP0_MAX_DATA};
use tracing::{debug, info, warn};

use crate::context::{ConnectionContext, DeviceState};
use crate::streamer::{Streamer, REPORT_INTERVAL};
use crate::EmulatorResult;

enum Reply {
    /// The data-stage length: bytes of the scratch buffer to send for IN
    /// requests, bytes to read and discard for OUT requests. Truncated to
    /// wLength either way.
    Data(usize),
    /// The request is outside the device's protocol.
    Stall,
}

/// Handle one SETUP packet end to end.
///
/// # Errors
///
/// Only transport I/O failures and internal encoding bugs surface as
/// errors; a request the device simply does not implement is answered
/// with a stall and `Ok`.
pub fn handle_control(
    transport: &Arc<dyn GadgetTransport>,
    ctx: &mut ConnectionContext,
    setup: [u8; 8],
) -> EmulatorResult<()> {
    let request = ControlRequest::parse(&setup)?;
    debug!(
        request = request.describe(),
        request_type = format_args!("{:#04x}", request.request_type),
        value = format_args!("{:#06x}", request.value),
        index = request.index,
        length = request.length,
        "control transfer"
    );

    let mut buf = [0u8; EP0_MAX_DATA];
    match execute(transport, ctx, &request, &mut buf)? {
        Reply::Data(len) => match request.direction() {
            Direction::In => {
                let len = len.min(request.length as usize);
                transport.ep0_write(&buf[..len])?;
            }
            Direction::Out => {
                let len = len.min(request.length as usize).min(buf.len());
                transport.ep0_read(&mut buf[..len])?;
            }
        },
        Reply::Stall => {
            warn!(request = request.describe(), "stalling unsupported control transfer");
            transport.ep0_stall()?;
        }
    }
    Ok(())
}

fn execute(
    transport: &Arc<dyn GadgetTransport>,
    ctx: &mut ConnectionContext,
    request: &ControlRequest,
    buf: &mut [u8],
) -> EmulatorResult<Reply> {
    match request.kind() {
        RequestKind::Standard => standard(transport, ctx, request, buf),
        RequestKind::Class => class(transport, ctx, request),
        RequestKind::Vendor | RequestKind::Reserved => Ok(Reply::Stall),
    }
}

fn standard(
    transport: &Arc<dyn GadgetTransport>,
    ctx: &mut ConnectionContext,
    request: &ControlRequest,
    buf: &mut [u8],
) -> EmulatorResult<Reply> {
    match request.request {
        usb::REQ_GET_DESCRIPTOR => descriptor(ctx, request, buf),
        usb::REQ_SET_CONFIGURATION => {
            // A replayed SET_CONFIGURATION is acknowledged without
            // re-enabling the endpoint.
            if ctx.state == DeviceState::Unconfigured {
                let handle = transport.ep_enable(&ctx.descriptors.endpoint.to_bytes())?;
                ctx.int_in = Some(handle);
                transport.vbus_draw(ids::MAX_POWER)?;
                transport.configure()?;
                ctx.state = DeviceState::Configured;
                info!(
                    endpoint = format_args!("{:#04x}", ctx.descriptors.endpoint.address),
                    "device configured"
                );
            }
            Ok(Reply::Data(0))
        }
        usb::REQ_GET_INTERFACE => {
            buf[0] = ctx.descriptors.interface.alternate_setting;
            Ok(Reply::Data(1))
        }
        _ => Ok(Reply::Stall),
    }
}

fn descriptor(
    ctx: &ConnectionContext,
    request: &ControlRequest,
    buf: &mut [u8],
) -> EmulatorResult<Reply> {
    match request.descriptor_type() {
        usb::DT_DEVICE => Ok(Reply::Data(ctx.descriptors.device.encode_into(buf)?)),
        usb::DT_DEVICE_QUALIFIER => Ok(Reply::Data(ctx.descriptors.qualifier.encode_into(buf)?)),
        usb::DT_CONFIG => Ok(Reply::Data(ctx.descriptors.build_configuration(buf)?)),
        usb::DT_STRING => {
            match string_descriptor(request.descriptor_index(), request.index, buf) {
                Ok(len) => Ok(Reply::Data(len)),
                Err(PenProtocolError::UnknownStringDescriptor { index, lang }) => {
                    warn!(
                        index,
                        lang = format_args!("{lang:#06x}"),
                        "unknown string descriptor requested"
                    );
                    Ok(Reply::Stall)
                }
                Err(err) => Err(err.into()),
            }
        }
        // The standalone HID descriptor (0x21) is only served embedded in
        // the configuration chain; a direct request falls through to the
        // stall below.
        usb::DT_REPORT => {
            let len = REPORT_DESCRIPTOR.len();
            if buf.len() < len {
                return Err(PenProtocolError::BufferTooSmall {
                    needed: len,
                    capacity: buf.len(),
                }
                .into());
            }
            buf[..len].copy_from_slice(REPORT_DESCRIPTOR);
            Ok(Reply::Data(len))
        }
        other => {
            debug!(descriptor_type = other, "descriptor type not offered");
            Ok(Reply::Stall)
        }
    }
}

fn class(
    transport: &Arc<dyn GadgetTransport>,
    ctx: &mut ConnectionContext,
    request: &ControlRequest,
) -> EmulatorResult<Reply> {
    match request.request {
        usb::HID_REQ_SET_IDLE => {
            start_streamer(transport, ctx)?;
            Ok(Reply::Data(0))
        }
        // The host's 1-byte output report is read in the data stage and
        // dropped; the tablet has no LEDs or feature state to update.
        usb::HID_REQ_SET_REPORT => Ok(Reply::Data(1)),
        usb::HID_REQ_SET_PROTOCOL => Ok(Reply::Data(0)),
        _ => Ok(Reply::Stall),
    }
}

fn start_streamer(
    transport: &Arc<dyn GadgetTransport>,
    ctx: &mut ConnectionContext,
) -> EmulatorResult<()> {
    if ctx.streamer.is_some() {
        return Ok(());
    }
    let Some(ep) = ctx.int_in else {
        warn!("SET_IDLE before configuration, report stream not started");
        return Ok(());
    };
    ctx.streamer = Some(Streamer::spawn(Arc::clone(transport), ep, REPORT_INTERVAL)?);
    info!("report stream started");
    Ok(())
}
