//! Linux input event codes (see `linux/input-event-codes.h`)

/// Highest key/button code
pub const KEY_MAX: u16 = 0x2ff;
/// Highest absolute axis code
pub const ABS_MAX: u16 = 0x3f;

/// Button codes by name
pub const BUTTONS: &[(&str, u16)] = &[
    ("BTN_0", 0x100),
    ("BTN_1", 0x101),
    ("BTN_2", 0x102),
    ("BTN_3", 0x103),
    ("BTN_4", 0x104),
    ("BTN_5", 0x105),
    ("BTN_6", 0x106),
    ("BTN_7", 0x107),
    ("BTN_8", 0x108),
    ("BTN_9", 0x109),
    ("BTN_LEFT", 0x110),
    ("BTN_RIGHT", 0x111),
    ("BTN_MIDDLE", 0x112),
    ("BTN_SIDE", 0x113),
    ("BTN_EXTRA", 0x114),
    ("BTN_FORWARD", 0x115),
    ("BTN_BACK", 0x116),
    ("BTN_TASK", 0x117),
    ("BTN_TRIGGER", 0x120),
    ("BTN_THUMB", 0x121),
    ("BTN_THUMB2", 0x122),
    ("BTN_TOP", 0x123),
    ("BTN_TOP2", 0x124),
    ("BTN_PINKIE", 0x125),
    ("BTN_BASE", 0x126),
    ("BTN_BASE2", 0x127),
    ("BTN_BASE3", 0x128),
    ("BTN_BASE4", 0x129),
    ("BTN_BASE5", 0x12a),
    ("BTN_BASE6", 0x12b),
    ("BTN_DEAD", 0x12f),
    ("BTN_SOUTH", 0x130),
    ("BTN_A", 0x130),
    ("BTN_EAST", 0x131),
    ("BTN_B", 0x131),
    ("BTN_C", 0x132),
    ("BTN_NORTH", 0x133),
    ("BTN_X", 0x133),
    ("BTN_WEST", 0x134),
    ("BTN_Y", 0x134),
    ("BTN_Z", 0x135),
    ("BTN_TL", 0x136),
    ("BTN_TR", 0x137),
    ("BTN_TL2", 0x138),
    ("BTN_TR2", 0x139),
    ("BTN_SELECT", 0x13a),
    ("BTN_START", 0x13b),
    ("BTN_MODE", 0x13c),
    ("BTN_THUMBL", 0x13d),
    ("BTN_THUMBR", 0x13e),
    ("BTN_GEAR_DOWN", 0x150),
    ("BTN_GEAR_UP", 0x151),
    ("BTN_DPAD_UP", 0x220),
    ("BTN_DPAD_DOWN", 0x221),
    ("BTN_DPAD_LEFT", 0x222),
    ("BTN_DPAD_RIGHT", 0x223),
    ("BTN_TRIGGER_HAPPY1", 0x2c0),
];

/// Absolute axis codes by name
pub const AXES: &[(&str, u16)] = &[
    ("ABS_X", 0x00),
    ("ABS_Y", 0x01),
    ("ABS_Z", 0x02),
    ("ABS_RX", 0x03),
    ("ABS_RY", 0x04),
    ("ABS_RZ", 0x05),
    ("ABS_THROTTLE", 0x06),
    ("ABS_RUDDER", 0x07),
    ("ABS_WHEEL", 0x08),
    ("ABS_GAS", 0x09),
    ("ABS_BRAKE", 0x0a),
    ("ABS_HAT0X", 0x10),
    ("ABS_HAT0Y", 0x11),
    ("ABS_HAT1X", 0x12),
    ("ABS_HAT1Y", 0x13),
    ("ABS_HAT2X", 0x14),
    ("ABS_HAT2Y", 0x15),
    ("ABS_HAT3X", 0x16),
    ("ABS_HAT3Y", 0x17),
    ("ABS_PRESSURE", 0x18),
    ("ABS_DISTANCE", 0x19),
    ("ABS_TILT_X", 0x1a),
    ("ABS_TILT_Y", 0x1b),
    ("ABS_TOOL_WIDTH", 0x1c),
    ("ABS_VOLUME", 0x20),
    ("ABS_PROFILE", 0x21),
    ("ABS_MISC", 0x28),
];

/// Which code space a code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSpace {
    Button,
    Axis,
}

impl CodeSpace {
    pub fn max(self) -> u16 {
        match self {
            CodeSpace::Button => KEY_MAX,
            CodeSpace::Axis => ABS_MAX,
        }
    }

    fn names(self) -> &'static [(&'static str, u16)] {
        match self {
            CodeSpace::Button => BUTTONS,
            CodeSpace::Axis => AXES,
        }
    }

    /// Look up a symbolic name (case-insensitive) or a `0x` hex literal
    pub fn parse(self, text: &str) -> Option<u16> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            return u16::from_str_radix(hex, 16).ok();
        }
        if let Ok(code) = text.parse::<u16>() {
            return Some(code);
        }
        self.names()
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(text))
            .map(|(_, code)| *code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!(CodeSpace::Button.parse("BTN_SOUTH"), Some(0x130));
        assert_eq!(CodeSpace::Button.parse("btn_a"), Some(0x130));
        assert_eq!(CodeSpace::Axis.parse("ABS_VOLUME"), Some(0x20));
        assert_eq!(CodeSpace::Axis.parse("BTN_0"), None);
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(CodeSpace::Axis.parse("0x3e"), Some(0x3e));
        assert_eq!(CodeSpace::Button.parse(" 256 "), Some(0x100));
        assert_eq!(CodeSpace::Button.parse("0xzz"), None);
    }
}
