//! Transport between the player and the USB host
//!
//! The transport owns enumeration and transfer execution. It is expected to accept only
//! one interrupt transfer in flight on the report endpoint and to refuse further
//! submissions until the host has collected the previous one.

use embedded_time::duration::Milliseconds;
use log::trace;
use usb_device::class_prelude::*;
use usb_device::device::{UsbDevice, UsbDeviceBuilder, UsbDeviceState, UsbVidPid};

use crate::device::keyboard::{BootKeyboardReport, REPORT_LEN};
use crate::hid_class::{ControlHandler, HandshakeClass, HidKeyboardClass};
use crate::{BuilderError, BuilderResult};

/// Highest current a bus powered device may draw
pub const MAX_POWER_MA: usize = 500;

pub trait Transport {
    type Error: core::fmt::Debug;

    /// Processes pending bus events. Setup packets are offered to `control` first and fall
    /// back to the transport's own handling when it returns
    /// [`ControlResponse::Default`](crate::hid_class::ControlResponse::Default).
    fn poll_events(&mut self, control: &mut dyn ControlHandler);

    /// Submits one report on the interrupt IN endpoint. Completion is not awaited.
    fn submit_interrupt_transfer(&mut self, report: &BootKeyboardReport) -> Result<(), Self::Error>;
}

/// USB device descriptor fields and endpoint timing of the emulated keyboard
#[derive(Clone, Copy)]
pub struct DeviceIdentity {
    pub vid: u16,
    pub pid: u16,
    pub device_release: u16,
    pub manufacturer: &'static str,
    pub product: &'static str,
    pub max_power_ma: usize,
    pub remote_wakeup: bool,
    pub poll_interval: Milliseconds,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            vid: 0x03F0,
            pid: 0x0024,
            device_release: 0x0300,
            manufacturer: "usbd-keystroke-player",
            product: "Keyboard",
            max_power_ma: 500,
            remote_wakeup: true,
            poll_interval: Milliseconds(1),
        }
    }
}

/// [`Transport`] backed by a `usb-device` stack
pub struct UsbTransport<'a, B: UsbBus> {
    device: UsbDevice<'a, B>,
    class: HidKeyboardClass<'a, B>,
}

impl<'a, B: UsbBus> UsbTransport<'a, B> {
    pub fn new(usb_alloc: &'a UsbBusAllocator<B>, identity: DeviceIdentity) -> BuilderResult<Self> {
        if identity.max_power_ma > MAX_POWER_MA {
            return Err(BuilderError::ValueOverflow);
        }
        let class = HidKeyboardClass::new(usb_alloc, identity.poll_interval)?;
        let device = UsbDeviceBuilder::new(usb_alloc, UsbVidPid(identity.vid, identity.pid))
            .manufacturer(identity.manufacturer)
            .product(identity.product)
            .device_release(identity.device_release)
            .max_packet_size_0(64)
            .max_power(identity.max_power_ma)
            .supports_remote_wakeup(identity.remote_wakeup)
            .build();
        Ok(Self { device, class })
    }

    pub fn state(&self) -> UsbDeviceState {
        self.device.state()
    }
}

impl<B: UsbBus> Transport for UsbTransport<'_, B> {
    type Error = UsbError;

    fn poll_events(&mut self, control: &mut dyn ControlHandler) {
        let mut class = HandshakeClass::new(&mut self.class, control);
        if self.device.poll(&mut [&mut class]) {
            trace!("usb events processed, device {:?}", self.device.state());
        }
    }

    fn submit_interrupt_transfer(&mut self, report: &BootKeyboardReport) -> Result<(), UsbError> {
        match self.class.write_report(report)? {
            REPORT_LEN => Ok(()),
            _ => Err(UsbError::BufferOverflow),
        }
    }
}
