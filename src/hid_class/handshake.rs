//! Enumeration handshake: report descriptor and SET_IDLE
//!
//! A generic HID host fetches the report descriptor and issues SET_IDLE before it starts
//! polling the interrupt endpoint. Reports must not be sent before both were answered.

use core::cmp::min;

use log::{debug, info, trace};
use packed_struct::prelude::*;
use usb_device::control::{Request, RequestType};

use usbd_hid::descriptor::SerializedDescriptor;

use super::{DescriptorType, HidRequest};
use crate::device::keyboard::BootKeyboardReport;

/// bmRequestType of a standard, device to host, interface request
pub const GET_INTERFACE_DESCRIPTOR_REQUEST_TYPE: u8 = 0x81;
/// bmRequestType of a class, host to device, interface request
pub const SET_INTERFACE_CLASS_REQUEST_TYPE: u8 = 0x21;

/// Raw 8 byte control setup packet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupPacket {
    pub request_type: u8,
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: u16,
}

impl SetupPacket {
    pub fn from_bytes(data: &[u8; 8]) -> Self {
        Self {
            request_type: data[0],
            request: data[1],
            value: u16::from_le_bytes([data[2], data[3]]),
            index: u16::from_le_bytes([data[4], data[5]]),
            length: u16::from_le_bytes([data[6], data[7]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; 8] {
        let value = self.value.to_le_bytes();
        let index = self.index.to_le_bytes();
        let length = self.length.to_le_bytes();
        [
            self.request_type,
            self.request,
            value[0],
            value[1],
            index[0],
            index[1],
            length[0],
            length[1],
        ]
    }

    fn descriptor_type(&self) -> Option<DescriptorType> {
        DescriptorType::from_primitive((self.value >> 8) as u8)
    }

    fn is_report_descriptor_request(&self) -> bool {
        self.request_type == GET_INTERFACE_DESCRIPTOR_REQUEST_TYPE
            && self.request == Request::GET_DESCRIPTOR
            && self.descriptor_type() == Some(DescriptorType::Report)
    }

    fn is_set_idle_request(&self) -> bool {
        self.request_type == SET_INTERFACE_CLASS_REQUEST_TYPE
            && HidRequest::from_primitive(self.request) == Some(HidRequest::SetIdle)
    }
}

impl From<&Request> for SetupPacket {
    fn from(request: &Request) -> Self {
        let request_type = match request.request_type {
            RequestType::Standard => 0,
            RequestType::Class => 1,
            RequestType::Vendor => 2,
            RequestType::Reserved => 3,
        };
        Self {
            request_type: request.direction as u8 | request_type << 5 | request.recipient as u8,
            request: request.request,
            value: request.value,
            index: request.index,
            length: request.length,
        }
    }
}

/// What the transport should do with a setup packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlResponse {
    /// Send `data` in the data stage, skip default handling
    Reply(&'static [u8]),
    /// Complete with a zero length status stage, skip default handling
    Acknowledge,
    /// Not ours, let the transport handle it
    Default,
}

/// Callback offered every setup packet the transport receives
pub trait ControlHandler {
    fn setup(&mut self, setup: &SetupPacket) -> ControlResponse;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    AwaitingDescriptorRequest,
    AwaitingIdleRequest,
    Ready,
}

/// Answers the enumeration requests of a HID host and tracks when reports may be sent
///
/// The descriptor and idle requests may arrive in either order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandshakeHandler {
    descriptor_served: bool,
    idle_acknowledged: bool,
}

impl HandshakeHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> HandshakeState {
        match (self.descriptor_served, self.idle_acknowledged) {
            (true, true) => HandshakeState::Ready,
            (true, false) => HandshakeState::AwaitingIdleRequest,
            (false, _) => HandshakeState::AwaitingDescriptorRequest,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == HandshakeState::Ready
    }

    fn mark(&mut self, update: impl FnOnce(&mut Self)) {
        let before = self.state();
        update(self);
        let after = self.state();
        if before != after {
            debug!("handshake {:?} -> {:?}", before, after);
            if after == HandshakeState::Ready {
                info!("host handshake complete");
            }
        }
    }
}

impl ControlHandler for HandshakeHandler {
    fn setup(&mut self, setup: &SetupPacket) -> ControlResponse {
        if setup.is_report_descriptor_request() {
            let descriptor = BootKeyboardReport::desc();
            let len = min(setup.length as usize, descriptor.len());
            trace!("report descriptor requested, sending {} bytes", len);
            self.mark(|h| h.descriptor_served = true);
            ControlResponse::Reply(&descriptor[..len])
        } else if setup.is_set_idle_request() {
            trace!("set idle {:#06X}", setup.value);
            self.mark(|h| h.idle_acknowledged = true);
            ControlResponse::Acknowledge
        } else {
            ControlResponse::Default
        }
    }
}
