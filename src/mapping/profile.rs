use super::bank::BankResolver;
use super::rules::{LogicalIndex, RangeMapper};
use super::table::CodeTable;
use crate::midi::MidiMessage;
use crate::types::events::OutputEvent;

/// Mapper plus the table its indices resolve through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlMap {
    pub mapper: RangeMapper,
    pub table: CodeTable,
}

impl ControlMap {
    pub fn new(mapper: RangeMapper, table: CodeTable) -> Self {
        Self { mapper, table }
    }
}

/// Registered value domain of every axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

impl AxisRange {
    /// Highest controller value
    const CC_MAX: i64 = 127;

    /// Map a controller value linearly onto `min..=max`
    ///
    /// 0 lands on `min` and 127 on `max`. The default 0..=127 domain passes
    /// values through unchanged.
    pub fn scale(&self, value: u8) -> i32 {
        let value = (value as i64).min(Self::CC_MAX);
        let span = self.max as i64 - self.min as i64;
        (self.min as i64 + span * value / Self::CC_MAX) as i32
    }
}

/// Runtime device profile: which MIDI controls become which buttons and
/// axes, and what the virtual device registers
///
/// Built once at startup from a validated `ProfileConfig` and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    pub name: String,
    pub banks: BankResolver,
    pub buttons: ControlMap,
    pub axes: ControlMap,
    pub axis_range: AxisRange,
    pub init_message: Option<Vec<u8>>,
}

/// Where a decoded message ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Translation {
    Button { index: LogicalIndex, event: OutputEvent },
    Axis { index: LogicalIndex, event: OutputEvent },
    Unmapped,
}

impl Translation {
    pub fn event(&self) -> Option<OutputEvent> {
        match self {
            Translation::Button { event, .. } | Translation::Axis { event, .. } => Some(*event),
            Translation::Unmapped => None,
        }
    }
}

impl DeviceProfile {
    /// Resolve bank, logical index and device code for a decoded message
    pub fn translate(&self, message: &MidiMessage) -> Translation {
        match *message {
            MidiMessage::Note { channel, note, on } => {
                let Some(index) = self
                    .banks
                    .resolve(channel)
                    .and_then(|bank| self.buttons.mapper.map(note, bank))
                else {
                    return Translation::Unmapped;
                };
                Translation::Button {
                    index,
                    event: OutputEvent::key(self.buttons.table.code(index), on),
                }
            }
            MidiMessage::ControlChange {
                channel,
                controller,
                value,
            } => {
                let Some(index) = self
                    .banks
                    .resolve(channel)
                    .and_then(|bank| self.axes.mapper.map(controller, bank))
                else {
                    return Translation::Unmapped;
                };
                let code = self.axes.table.code(index);
                Translation::Axis {
                    index,
                    event: OutputEvent::abs(code, self.axis_range.scale(value)),
                }
            }
            MidiMessage::Unrecognized => Translation::Unmapped,
        }
    }
}
