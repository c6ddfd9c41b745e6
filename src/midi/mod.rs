pub mod handler;
pub mod message;
pub mod source;

pub use handler::MidiPortSource;
pub use message::{MidiMessage, RawMessage};
pub use source::{DeviceFileSource, MidiSource};
