use std::io;

use anyhow::{anyhow, Result};
use crossbeam_channel::{Receiver, TryRecvError};
use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use tracing::{info, warn};

use super::message::RawMessage;
use super::source::MidiSource;

const CLIENT_NAME: &str = "midi-joy";

/// MIDI input port opened through midir (ALSA sequencer on Linux)
///
/// midir delivers messages on its own thread; they are handed over through a
/// channel so `poll` stays non-blocking.
pub struct MidiPortSource {
    _connection: MidiInputConnection<()>,
    messages: Receiver<RawMessage>,
    output: Option<MidiOutputConnection>,
}

impl MidiPortSource {
    /// Connect to the input port matching `search` (index or name substring)
    /// and, if one exists, to the output port matching the same search
    pub fn connect(search: &str) -> Result<Self> {
        let midi_in = MidiInput::new("midi-joy-input")?;
        let ports = midi_in.ports();
        let names: Vec<String> = ports
            .iter()
            .map(|p| midi_in.port_name(p).unwrap_or_else(|_| "Unknown".to_string()))
            .collect();

        let index = find_port(&names, search)?;
        info!("Connecting to MIDI port: {}", names[index]);

        let (tx, messages) = crossbeam_channel::unbounded();
        let connection = midi_in
            .connect(
                &ports[index],
                CLIENT_NAME,
                move |_timestamp, bytes, _| {
                    if let Some(message) = to_raw(bytes) {
                        // Receiver only goes away at shutdown
                        let _ = tx.try_send(message);
                    }
                },
                (),
            )
            .map_err(|e| anyhow!("Failed to connect to MIDI port: {}", e))?;

        let output = match connect_output(search) {
            Ok(output) => Some(output),
            Err(e) => {
                warn!("No MIDI output for '{}': {:#}", search, e);
                None
            }
        };

        Ok(Self {
            _connection: connection,
            messages,
            output,
        })
    }

    /// List all available MIDI input ports
    pub fn list_devices() -> Result<Vec<String>> {
        let midi_in = MidiInput::new("midi-joy-list")?;
        let ports = midi_in.ports();

        let mut devices = Vec::new();
        for port in ports.iter() {
            if let Ok(name) = midi_in.port_name(port) {
                devices.push(name);
            }
        }

        Ok(devices)
    }
}

impl MidiSource for MidiPortSource {
    fn poll(&mut self) -> io::Result<Option<RawMessage>> {
        match self.messages.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "MIDI input connection closed",
            )),
        }
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self.output.as_mut() {
            Some(output) => output.send(bytes).map_err(io::Error::other),
            None => Ok(()),
        }
    }
}

fn connect_output(search: &str) -> Result<MidiOutputConnection> {
    let midi_out = MidiOutput::new("midi-joy-output")?;
    let ports = midi_out.ports();
    let names: Vec<String> = ports
        .iter()
        .map(|p| midi_out.port_name(p).unwrap_or_else(|_| "Unknown".to_string()))
        .collect();

    let index = find_port(&names, search)?;
    midi_out
        .connect(&ports[index], CLIENT_NAME)
        .map_err(|e| anyhow!("Failed to connect to MIDI output port: {}", e))
}

/// Copy the first three bytes of a message, zero padded
fn to_raw(bytes: &[u8]) -> Option<RawMessage> {
    if bytes.is_empty() {
        return None;
    }
    let mut message = [0u8; 3];
    let n = bytes.len().min(message.len());
    message[..n].copy_from_slice(&bytes[..n]);
    Some(message)
}

/// Find a port index by number or case-insensitive name substring
pub fn find_port(names: &[String], search: &str) -> Result<usize> {
    if names.is_empty() {
        return Err(anyhow!("No MIDI ports found"));
    }

    // Try to parse as index first
    if let Ok(index) = search.parse::<usize>() {
        if index < names.len() {
            return Ok(index);
        } else {
            return Err(anyhow!(
                "MIDI port index {} out of range (0-{})",
                index,
                names.len() - 1
            ));
        }
    }

    let search_lower = search.to_lowercase();
    names
        .iter()
        .position(|name| name.to_lowercase().contains(&search_lower))
        .ok_or_else(|| anyhow!("MIDI port '{}' not found", search))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec![
            "Midi Through:Midi Through Port-0 14:0".to_string(),
            "Launch Control XL:Launch Control XL MIDI 1 20:0".to_string(),
        ]
    }

    #[test]
    fn test_find_port_by_index() {
        assert_eq!(find_port(&names(), "1").unwrap(), 1);
        assert!(find_port(&names(), "2").is_err());
    }

    #[test]
    fn test_find_port_by_name() {
        assert_eq!(find_port(&names(), "launch control").unwrap(), 1);
        assert!(find_port(&names(), "nanokontrol").is_err());
        assert!(find_port(&[], "0").is_err());
    }

    #[test]
    fn test_to_raw_pads_short_messages() {
        assert_eq!(to_raw(&[0xC0, 5]), Some([0xC0, 5, 0]));
        assert_eq!(to_raw(&[0x90, 41, 127, 0x00]), Some([0x90, 41, 127]));
        assert_eq!(to_raw(&[]), None);
    }
}
