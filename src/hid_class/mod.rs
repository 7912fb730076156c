//! Boot keyboard HID class for `usb-device`
//!
//! Control requests are answered by a [`ControlHandler`], everything else about the
//! interface (descriptors, the interrupt IN endpoint) lives in [`HidKeyboardClass`].

use delegate::delegate;
use embedded_time::duration::Milliseconds;
use log::{error, trace, warn};
use packed_struct::prelude::*;
use ssmarshal::serialize;
use usb_device::class_prelude::*;
use usb_device::control::{Recipient, Request};
use usb_device::Result;
use usbd_hid::descriptor::SerializedDescriptor;

use crate::device::keyboard::{BootKeyboardReport, REPORT_LEN};
use crate::BuilderError;
use crate::BuilderResult;

pub mod handshake;

pub use handshake::{ControlHandler, ControlResponse, HandshakeHandler, HandshakeState, SetupPacket};

const USB_CLASS_HID: u8 = 0x03;
const HID_SUBCLASS_BOOT: u8 = 0x01;
const HID_PROTOCOL_KEYBOARD: u8 = 0x01;
const HID_SPEC_RELEASE: u16 = 0x0110;
const HID_COUNTRY_NOT_SUPPORTED: u8 = 0x00;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PrimitiveEnum)]
#[repr(u8)]
pub enum HidRequest {
    GetReport = 0x01,
    GetIdle = 0x02,
    GetProtocol = 0x03,
    SetReport = 0x09,
    SetIdle = 0x0A,
    SetProtocol = 0x0B,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PrimitiveEnum)]
#[repr(u8)]
pub enum DescriptorType {
    Hid = 0x21,
    Report = 0x22,
    Physical = 0x23,
}

/// Body of the HID class descriptor, following bLength and bDescriptorType
pub fn hid_descriptor_body() -> [u8; 7] {
    let release = HID_SPEC_RELEASE.to_le_bytes();
    let report_len = (BootKeyboardReport::desc().len() as u16).to_le_bytes();
    [
        release[0],
        release[1],
        HID_COUNTRY_NOT_SUPPORTED,
        1,
        DescriptorType::Report as u8,
        report_len[0],
        report_len[1],
    ]
}

/// Polling interval of the interrupt IN endpoint
pub fn poll_interval(interval: Milliseconds) -> BuilderResult<u8> {
    u8::try_from(interval.0)
        .ok()
        .filter(|&ms| ms > 0)
        .ok_or(BuilderError::ValueOverflow)
}

/// Boot keyboard interface with a single 8 byte interrupt IN endpoint
pub struct HidKeyboardClass<'a, B: UsbBus> {
    interface: InterfaceNumber,
    endpoint: EndpointIn<'a, B>,
}

impl<'a, B: UsbBus> HidKeyboardClass<'a, B> {
    pub fn new(usb_alloc: &'a UsbBusAllocator<B>, interval: Milliseconds) -> BuilderResult<Self> {
        let interval = poll_interval(interval)?;
        Ok(Self {
            interface: usb_alloc.interface(),
            endpoint: usb_alloc.interrupt(REPORT_LEN as u16, interval),
        })
    }

    pub fn id(&self) -> InterfaceNumber {
        self.interface
    }

    /// Queues `report` on the IN endpoint.
    ///
    /// Returns [`UsbError::WouldBlock`] while the previous report has not been collected by
    /// the host.
    pub fn write_report(&self, report: &BootKeyboardReport) -> Result<usize> {
        let mut data = [0u8; REPORT_LEN];
        let size = serialize(&mut data, report).map_err(|e| {
            error!("Error packing BootKeyboardReport: {:?}", e);
            UsbError::ParseError
        })?;
        self.endpoint.write(&data[..size])
    }

    pub fn get_configuration_descriptors(&self, writer: &mut DescriptorWriter) -> Result<()> {
        writer.interface(
            self.interface,
            USB_CLASS_HID,
            HID_SUBCLASS_BOOT,
            HID_PROTOCOL_KEYBOARD,
        )?;
        writer.write(DescriptorType::Hid as u8, &hid_descriptor_body())?;
        writer.endpoint(&self.endpoint)?;
        Ok(())
    }

    pub fn endpoint_in_complete(&mut self, addr: EndpointAddress) {
        if addr == self.endpoint.address() {
            trace!("report collected by host");
        }
    }

    fn is_for_interface(&self, request: &Request) -> bool {
        request.recipient == Recipient::Interface
            && u8::try_from(request.index).ok() == Some(u8::from(self.interface))
    }
}

/// Short lived pairing of the class with a control handler, built for one bus poll
pub struct HandshakeClass<'h, 'a, B: UsbBus, C: ControlHandler + ?Sized> {
    class: &'h mut HidKeyboardClass<'a, B>,
    control: &'h mut C,
}

impl<'h, 'a, B: UsbBus, C: ControlHandler + ?Sized> HandshakeClass<'h, 'a, B, C> {
    pub fn new(class: &'h mut HidKeyboardClass<'a, B>, control: &'h mut C) -> Self {
        Self { class, control }
    }
}

impl<B: UsbBus, C: ControlHandler + ?Sized> UsbClass<B> for HandshakeClass<'_, '_, B, C> {
    delegate! {
        to self.class {
            fn get_configuration_descriptors(&self, writer: &mut DescriptorWriter) -> Result<()>;
            fn endpoint_in_complete(&mut self, addr: EndpointAddress);
        }
    }

    fn control_out(&mut self, transfer: ControlOut<B>) {
        let request: &Request = transfer.request();

        //only respond to requests for this interface
        if !self.class.is_for_interface(request) {
            return;
        }

        match self.control.setup(&SetupPacket::from(request)) {
            ControlResponse::Acknowledge => {
                if let Err(e) = transfer.accept() {
                    error!("Failed to accept control out request: {:?}", e);
                }
            }
            ControlResponse::Reply(_) => {
                warn!("Reply to host to device request {:#04X} ignored", request.request);
            }
            ControlResponse::Default => {}
        }
    }

    fn control_in(&mut self, transfer: ControlIn<B>) {
        let request: &Request = transfer.request();

        //only respond to requests for this interface
        if !self.class.is_for_interface(request) {
            return;
        }

        match self.control.setup(&SetupPacket::from(request)) {
            ControlResponse::Reply(data) => {
                if let Err(e) = transfer.accept_with_static(data) {
                    error!("Failed to send control in reply: {:?}", e);
                }
            }
            ControlResponse::Acknowledge => {
                if let Err(e) = transfer.accept_with(&[]) {
                    error!("Failed to acknowledge control in request: {:?}", e);
                }
            }
            ControlResponse::Default => {}
        }
    }
}
