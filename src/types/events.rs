use std::fmt;

/// Kind of event written to the virtual device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Button press or release (EV_KEY)
    Key,
    /// Absolute axis position (EV_ABS)
    Abs,
    /// End of a frame (EV_SYN / SYN_REPORT)
    Sync,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Key => "key",
            EventKind::Abs => "abs",
            EventKind::Sync => "sync",
        };
        f.write_str(name)
    }
}

/// Output event sent to the virtual device
/// Constructed and written immediately, never queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputEvent {
    pub kind: EventKind,
    pub code: u16,
    pub value: i32,
}

impl OutputEvent {
    /// Create a button event, value 1 when pressed
    pub fn key(code: u16, pressed: bool) -> Self {
        OutputEvent {
            kind: EventKind::Key,
            code,
            value: pressed as i32,
        }
    }

    /// Create an absolute axis event
    pub fn abs(code: u16, value: i32) -> Self {
        OutputEvent {
            kind: EventKind::Abs,
            code,
            value,
        }
    }

    /// Create the frame terminator (SYN_REPORT)
    pub fn sync() -> Self {
        OutputEvent {
            kind: EventKind::Sync,
            code: 0,
            value: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(OutputEvent::key(0x120, true).value, 1);
        assert_eq!(OutputEvent::key(0x120, false).value, 0);
        assert_eq!(
            OutputEvent::abs(0x20, 64),
            OutputEvent { kind: EventKind::Abs, code: 0x20, value: 64 }
        );
        assert_eq!(
            OutputEvent::sync(),
            OutputEvent { kind: EventKind::Sync, code: 0, value: 0 }
        );
    }
}
