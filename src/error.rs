use std::io;

use thiserror::Error;

use crate::types::events::EventKind;

/// Failures that end the poll loop
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The virtual device rejected a write; it is assumed gone
    #[error("failed to write {kind} event (code {code:#x}) to the virtual device: {source}")]
    Emit {
        kind: EventKind,
        code: u16,
        #[source]
        source: io::Error,
    },

    #[error("MIDI source failed {count} times in a row: {source}")]
    SourceFailed {
        count: u32,
        #[source]
        source: io::Error,
    },
}
