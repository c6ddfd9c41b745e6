use std::future::Future;
use std::io;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::device::{self, EventSink};
use crate::error::BridgeError;
use crate::mapping::DeviceProfile;
use crate::midi::{MidiMessage, MidiSource};

/// Sleep between polls while the source has nothing to read
pub const IDLE_BACKOFF: Duration = Duration::from_millis(50);

/// Poll loop tuning
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    pub idle_backoff: Duration,
    /// Consecutive read errors tolerated before giving up on the source
    pub max_consecutive_errors: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            idle_backoff: IDLE_BACKOFF,
            max_consecutive_errors: 100,
        }
    }
}

/// Counters reported at shutdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub received: u64,
    pub emitted: u64,
    pub dropped: u64,
    pub idle_polls: u64,
    pub read_errors: u64,
}

/// Owns the MIDI source, the virtual device and the profile connecting them
pub struct Bridge<S, K> {
    source: S,
    sink: K,
    profile: DeviceProfile,
    config: LoopConfig,
    stats: LoopStats,
    error_streak: u32,
}

impl<S: MidiSource, K: EventSink> Bridge<S, K> {
    pub fn new(source: S, sink: K, profile: DeviceProfile, config: LoopConfig) -> Self {
        Self {
            source,
            sink,
            profile,
            config,
            stats: LoopStats::default(),
            error_streak: 0,
        }
    }

    /// Poll, translate and emit until `shutdown` resolves or a fatal
    /// error occurs
    ///
    /// Shutdown is only observed between messages, so a data event and its
    /// sync are never split.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<LoopStats, BridgeError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                step = self.step() => step?,
            }
        }

        Ok(self.stats)
    }

    /// One iteration: handle a message, or back off when there is none
    async fn step(&mut self) -> Result<(), BridgeError> {
        match self.source.poll() {
            Ok(Some(raw)) => {
                self.error_streak = 0;
                self.handle(&MidiMessage::parse(&raw))
            }
            Ok(None) => {
                self.error_streak = 0;
                self.stats.idle_polls += 1;
                tokio::time::sleep(self.config.idle_backoff).await;
                Ok(())
            }
            Err(e) => {
                self.read_failed(e)?;
                tokio::time::sleep(self.config.idle_backoff).await;
                Ok(())
            }
        }
    }

    fn read_failed(&mut self, e: io::Error) -> Result<(), BridgeError> {
        self.stats.read_errors += 1;
        self.error_streak += 1;
        if self.error_streak >= self.config.max_consecutive_errors {
            return Err(BridgeError::SourceFailed {
                count: self.error_streak,
                source: e,
            });
        }
        warn!(
            "MIDI read failed ({}/{}): {}",
            self.error_streak, self.config.max_consecutive_errors, e
        );
        Ok(())
    }

    /// Translate one decoded message and emit it if it is mapped
    pub fn handle(&mut self, message: &MidiMessage) -> Result<(), BridgeError> {
        self.stats.received += 1;

        let translation = self.profile.translate(message);
        match message {
            MidiMessage::Note { channel, note, on } => {
                debug!("note={} channel={} on={} => {:?}", note, channel, on, translation);
            }
            MidiMessage::ControlChange { channel, controller, value } => {
                debug!(
                    "CC={} channel={} value={} => {:?}",
                    controller, channel, value, translation
                );
            }
            MidiMessage::Unrecognized => debug!("unrecognized message dropped"),
        }

        match translation.event() {
            Some(event) => {
                device::emit(&mut self.sink, event)?;
                self.stats.emitted += 1;
            }
            None => self.stats.dropped += 1,
        }
        Ok(())
    }

    /// Send the profile's init message to the controller, if it has one
    pub fn initialize_controller(&mut self) -> io::Result<()> {
        if let Some(bytes) = &self.profile.init_message {
            debug!("Sending init message {:02x?}", bytes);
            self.source.send(bytes)?;
        }
        Ok(())
    }

    /// Destroy the virtual device and close the source
    pub fn shutdown(mut self) {
        if let Err(e) = self.sink.close() {
            warn!("Failed to destroy virtual device: {}", e);
        }
        info!(
            "Stopped: {} messages, {} events, {} dropped, {} idle polls, {} read errors",
            self.stats.received,
            self.stats.emitted,
            self.stats.dropped,
            self.stats.idle_polls,
            self.stats.read_errors
        );
    }
}
