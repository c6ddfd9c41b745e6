use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::message::RawMessage;

/// A non-blocking supplier of raw MIDI messages
pub trait MidiSource {
    /// Return the next complete message, or `Ok(None)` when nothing is
    /// available right now. Must never block.
    fn poll(&mut self) -> io::Result<Option<RawMessage>>;

    /// Send raw bytes back to the controller
    fn send(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// Reassembles 3-byte channel-voice messages from a raw byte stream
///
/// A status byte always starts a new frame, so a short or unsupported
/// message (program change, SysEx) is discarded by the next status byte
/// instead of shifting every message after it.
#[derive(Debug, Default)]
pub struct Framer {
    frame: RawMessage,
    len: usize,
}

impl Framer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte, returning a message when it completes a frame
    pub fn push(&mut self, byte: u8) -> Option<RawMessage> {
        // Real-time bytes may appear anywhere, even inside a message
        if byte >= 0xF8 {
            return None;
        }

        if byte & 0x80 != 0 {
            self.frame = [byte, 0, 0];
            self.len = 1;
            return None;
        }

        // Data byte without a status: running status is not supported
        if self.len == 0 {
            return None;
        }

        self.frame[self.len] = byte;
        self.len += 1;
        if self.len == self.frame.len() {
            self.len = 0;
            Some(self.frame)
        } else {
            None
        }
    }
}

/// Raw MIDI character device such as `/dev/midi1` or `/dev/snd/midiC1D0`
pub struct DeviceFileSource {
    path: PathBuf,
    file: File,
    framer: Framer,
}

impl DeviceFileSource {
    /// Open the device read/write in non-blocking mode
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .with_context(|| format!("Failed to open MIDI device: {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            framer: Framer::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MidiSource for DeviceFileSource {
    fn poll(&mut self) -> io::Result<Option<RawMessage>> {
        let mut buf = [0u8; 3];
        loop {
            match self.file.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(n) => {
                    debug!("read: {:02x?}", &buf[..n]);
                    // At most one frame can complete per 3-byte read
                    let mut complete = None;
                    for &byte in &buf[..n] {
                        if let Some(message) = self.framer.push(byte) {
                            complete = Some(message);
                        }
                    }
                    if complete.is_some() {
                        return Ok(complete);
                    }
                    // Partial message: keep reading while bytes are flowing
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.file.write_all(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(framer: &mut Framer, bytes: &[u8]) -> Vec<RawMessage> {
        bytes.iter().filter_map(|&b| framer.push(b)).collect()
    }

    #[test]
    fn test_framer_whole_messages() {
        let mut framer = Framer::new();
        let out = feed(&mut framer, &[0x90, 41, 127, 0xB8, 13, 100]);
        assert_eq!(out, vec![[0x90, 41, 127], [0xB8, 13, 100]]);
    }

    #[test]
    fn test_framer_split_across_reads() {
        let mut framer = Framer::new();
        assert!(feed(&mut framer, &[0x90]).is_empty());
        assert!(feed(&mut framer, &[41]).is_empty());
        assert_eq!(feed(&mut framer, &[0]), vec![[0x90, 41, 0]]);
    }

    #[test]
    fn test_framer_resyncs_on_status_byte() {
        let mut framer = Framer::new();
        // Program change is two bytes long and never completes a frame
        let out = feed(&mut framer, &[0xC0, 5, 0x98, 57, 127]);
        assert_eq!(out, vec![[0x98, 57, 127]]);
    }

    #[test]
    fn test_framer_skips_realtime_and_orphan_data() {
        let mut framer = Framer::new();
        let out = feed(&mut framer, &[12, 34, 0xB0, 0xF8, 1, 0xFE, 64]);
        assert_eq!(out, vec![[0xB0, 1, 64]]);
    }

    #[test]
    fn test_open_missing_device_fails() {
        let err = DeviceFileSource::open("/nonexistent/midi-joy-test").err().unwrap();
        assert!(format!("{err:#}").contains("/nonexistent/midi-joy-test"));
    }

    #[test]
    fn test_poll_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("midi");
        std::fs::write(&path, [0x90, 41, 127, 0x80, 41]).unwrap();

        let mut source = DeviceFileSource::open(&path).unwrap();
        assert_eq!(source.path(), path.as_path());
        assert_eq!(source.poll().unwrap(), Some([0x90, 41, 127]));
        // Trailing partial message followed by end of file
        assert_eq!(source.poll().unwrap(), None);
    }
}
