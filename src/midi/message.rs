/// A single channel-voice message exactly as read from the source:
/// `[status, data1, data2]`
pub type RawMessage = [u8; 3];

/// MIDI message types we care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note on or note off. `on` is false for a note off and for a note on
    /// with velocity 0.
    Note { channel: u8, note: u8, on: bool },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Anything else (system messages, program change, pitch bend, ...)
    Unrecognized,
}

impl MidiMessage {
    /// Classify a raw 3-byte message
    /// Only the status byte decides the variant
    pub fn parse(bytes: &RawMessage) -> Self {
        let [status, data1, data2] = *bytes;
        let message_type = status & 0xF0;
        let channel = status & 0x0F;

        match message_type {
            // Controllers send note off either as 0x8n or as 0x9n with
            // velocity 0, so the velocity alone decides
            0x80 | 0x90 => MidiMessage::Note {
                channel,
                note: data1,
                on: data2 != 0,
            },
            0xB0 => MidiMessage::ControlChange {
                channel,
                controller: data1,
                value: data2,
            },
            _ => MidiMessage::Unrecognized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_on() {
        let msg = MidiMessage::parse(&[0x90, 60, 100]);
        assert_eq!(
            msg,
            MidiMessage::Note {
                channel: 0,
                note: 60,
                on: true
            }
        );
    }

    #[test]
    fn test_parse_note_off() {
        let msg = MidiMessage::parse(&[0x8A, 60, 0]);
        assert_eq!(
            msg,
            MidiMessage::Note {
                channel: 10,
                note: 60,
                on: false
            }
        );
    }

    #[test]
    fn test_note_on_velocity_zero_is_off() {
        let msg = MidiMessage::parse(&[0x90, 60, 0]);
        assert!(matches!(msg, MidiMessage::Note { on: false, .. }));
    }

    #[test]
    fn test_note_off_with_velocity_counts_as_on() {
        // Velocity wins over the status nibble
        let msg = MidiMessage::parse(&[0x80, 60, 64]);
        assert!(matches!(msg, MidiMessage::Note { on: true, .. }));
    }

    #[test]
    fn test_parse_control_change() {
        let msg = MidiMessage::parse(&[0xBF, 13, 100]);
        assert_eq!(
            msg,
            MidiMessage::ControlChange {
                channel: 15,
                controller: 13,
                value: 100
            }
        );
    }

    #[test]
    fn test_other_classes_are_unrecognized() {
        for status in [0xA0, 0xC3, 0xD0, 0xE5, 0xF0, 0xF7, 0xF8, 0xFF, 0x00, 0x7F] {
            assert_eq!(
                MidiMessage::parse(&[status, 41, 127]),
                MidiMessage::Unrecognized,
                "status {status:#04x}"
            );
        }
    }
}
