pub mod codes;
pub mod emitter;
pub mod uinput;

use std::io;

use crate::types::events::OutputEvent;

pub use emitter::emit;
pub use uinput::UinputSink;

/// Destination for output events, owned exclusively by the poll loop
pub trait EventSink {
    /// Write one event
    fn write(&mut self, event: OutputEvent) -> io::Result<()>;

    /// Deactivate the device
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}
