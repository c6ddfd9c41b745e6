use super::EventSink;
use crate::error::BridgeError;
use crate::types::events::OutputEvent;

/// Write one data event followed by its SYN_REPORT
///
/// Consumers only apply state at the sync, so a failure on either write
/// leaves the device unusable and is returned as fatal.
pub fn emit<S: EventSink + ?Sized>(sink: &mut S, event: OutputEvent) -> Result<(), BridgeError> {
    for event in [event, OutputEvent::sync()] {
        sink.write(event).map_err(|source| BridgeError::Emit {
            kind: event.kind,
            code: event.code,
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::events::EventKind;
    use std::io;

    /// Sink that records everything written to it
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub events: Vec<OutputEvent>,
        /// Fail the write with this index
        pub fail_at: Option<usize>,
    }

    impl EventSink for RecordingSink {
        fn write(&mut self, event: OutputEvent) -> io::Result<()> {
            if self.fail_at == Some(self.events.len()) {
                return Err(io::Error::new(io::ErrorKind::NotFound, "device removed"));
            }
            self.events.push(event);
            Ok(())
        }
    }

    #[test]
    fn test_emit_appends_sync() {
        let mut sink = RecordingSink::default();
        emit(&mut sink, OutputEvent::key(0x100, true)).unwrap();
        emit(&mut sink, OutputEvent::abs(0x02, 99)).unwrap();
        assert_eq!(
            sink.events,
            vec![
                OutputEvent::key(0x100, true),
                OutputEvent::sync(),
                OutputEvent::abs(0x02, 99),
                OutputEvent::sync(),
            ]
        );
    }

    #[test]
    fn test_emit_data_failure() {
        let mut sink = RecordingSink {
            fail_at: Some(0),
            ..Default::default()
        };
        let err = emit(&mut sink, OutputEvent::key(0x130, true)).unwrap_err();
        assert!(matches!(err, BridgeError::Emit { kind: EventKind::Key, code: 0x130, .. }));
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_emit_sync_failure() {
        let mut sink = RecordingSink {
            fail_at: Some(1),
            ..Default::default()
        };
        let err = emit(&mut sink, OutputEvent::abs(0x05, 1)).unwrap_err();
        assert!(matches!(err, BridgeError::Emit { kind: EventKind::Sync, code: 0, .. }));
        assert!(err.to_string().contains("sync"));
    }
}
