use std::io;

use anyhow::{Context, Result};
use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{
    AbsInfo, AbsoluteAxisType, AttributeSet, BusType, EventType, InputEvent, InputId, Key,
    UinputAbsSetup,
};
use tracing::info;

use super::EventSink;
use crate::mapping::DeviceProfile;
use crate::types::events::{EventKind, OutputEvent};

const VENDOR: u16 = 0x3;
const PRODUCT: u16 = 0x3;
const VERSION: u16 = 2;

/// Virtual joystick created through `/dev/uinput`
///
/// evdev terminates every `emit` batch with its own SYN_REPORT, so data
/// events are held until the sync event arrives and then written as one
/// frame.
pub struct UinputSink {
    device: Option<VirtualDevice>,
    pending: Vec<InputEvent>,
}

impl UinputSink {
    /// Register every button and axis of the profile and create the device
    pub fn create(profile: &DeviceProfile) -> Result<Self> {
        let mut keys = AttributeSet::<Key>::new();
        for &code in profile.buttons.table.codes() {
            keys.insert(Key::new(code));
        }
        info!(
            "Setting up {} buttons: {:x?}",
            profile.buttons.table.len(),
            profile.buttons.table.codes()
        );

        let mut builder = VirtualDeviceBuilder::new()
            .context("Failed to open /dev/uinput")?
            .name(profile.name.as_str())
            .input_id(InputId::new(BusType::BUS_USB, VENDOR, PRODUCT, VERSION));

        if !profile.buttons.table.is_empty() {
            builder = builder
                .with_keys(&keys)
                .context("Failed to register buttons")?;
        }

        let range = profile.axis_range;
        for &code in profile.axes.table.codes() {
            let setup = UinputAbsSetup::new(
                AbsoluteAxisType(code),
                AbsInfo::new(range.min, range.min, range.max, 0, 0, 0),
            );
            builder = builder
                .with_absolute_axis(&setup)
                .with_context(|| format!("Failed to register axis {:#x}", code))?;
        }
        info!(
            "Setting up {} axes: {:x?}",
            profile.axes.table.len(),
            profile.axes.table.codes()
        );

        let device = builder.build().context("Failed to create virtual device")?;
        info!("Virtual device '{}' created", profile.name);

        Ok(Self {
            device: Some(device),
            pending: Vec::with_capacity(1),
        })
    }
}

impl EventSink for UinputSink {
    fn write(&mut self, event: OutputEvent) -> io::Result<()> {
        let event_type = match event.kind {
            EventKind::Key => EventType::KEY,
            EventKind::Abs => EventType::ABSOLUTE,
            EventKind::Sync => {
                let device = self.device.as_mut().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotConnected, "virtual device closed")
                })?;
                let frame = std::mem::take(&mut self.pending);
                return device.emit(&frame);
            }
        };
        self.pending
            .push(InputEvent::new(event_type, event.code, event.value));
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.pending.clear();
        // Dropping the device destroys it
        if self.device.take().is_some() {
            info!("Virtual device destroyed");
        }
        Ok(())
    }
}
