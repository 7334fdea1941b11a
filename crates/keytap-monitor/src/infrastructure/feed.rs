//! Scancode feed selection and polling.
//!
//! The monitor reads raw scancode bytes from one of two feeds:
//!
//! - **External device** — when a device path is configured (config file or
//!   `DEVICE_PATH`), the monitor opens it non-blocking and reads raw bytes
//!   from it. An open failure is non-fatal: it is retried on every poll and
//!   surfaced only through the status line, never as a crash.
//! - **Embedded capture** — otherwise the monitor runs the capture
//!   subsystem in-process with the configured strategy and polls its device
//!   reader.
//!
//! Either way the poll contract is the same: data, empty, or not-ready.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use keytap_capture::infrastructure::capture::intercept::InterceptSource;
use keytap_capture::infrastructure::capture::mock::MockProbeBackend;
use keytap_capture::infrastructure::capture::synthetic::SyntheticSource;
use keytap_capture::{CaptureSubsystem, DeviceError, DeviceReader, EventSource, OpenMode};
use thiserror::Error;
use tracing::{info, warn};

use super::storage::config::MonitorConfig;

/// Error type for feed construction.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The embedded capture subsystem failed to initialise (e.g. the
    /// intercept strategy exhausted its candidate list).
    #[error(transparent)]
    Capture(#[from] keytap_capture::CaptureError),

    /// The configured capture source name is not recognised.
    #[error("unknown capture source `{0}` (expected `synthetic` or `intercept`)")]
    UnknownSource(String),
}

/// Outcome of one poll.
#[derive(Debug, PartialEq, Eq)]
pub enum FeedRead {
    /// This many bytes were copied into the destination.
    Data(usize),
    /// The feed is connected but has nothing buffered right now.
    Empty,
    /// The device is not openable yet; retried on the next poll.
    NotReady,
}

/// The monitor's byte source: external device file or embedded subsystem.
pub enum ScancodeFeed {
    External(ExternalDevice),
    Embedded(EmbeddedCapture),
}

impl ScancodeFeed {
    /// Builds the feed selected by `config`.
    ///
    /// # Errors
    ///
    /// Only embedded-subsystem initialisation can fail; an unreachable
    /// external device is handled per poll instead.
    pub fn from_config(config: &MonitorConfig) -> Result<Self, FeedError> {
        match config.device_path_override() {
            Some(path) => {
                info!(path = %path.display(), "reading scancodes from external device");
                Ok(Self::External(ExternalDevice::new(path)))
            }
            None => Ok(Self::Embedded(EmbeddedCapture::start(config)?)),
        }
    }

    /// Polls the feed once, copying any available bytes into `out`.
    pub fn poll(&mut self, out: &mut [u8]) -> FeedRead {
        match self {
            Self::External(device) => device.poll(out),
            Self::Embedded(capture) => capture.poll(out),
        }
    }

    /// One-line status for the display, in the original status-label style.
    pub fn status(&self) -> String {
        match self {
            Self::External(device) => device.status(),
            Self::Embedded(capture) => format!("capture: {}", capture.source_description()),
        }
    }

    /// Tears the feed down (stops the embedded subsystem, closes the file).
    pub fn shutdown(self) {
        if let Self::Embedded(capture) = self {
            capture.shutdown();
        }
    }
}

// ── External device ───────────────────────────────────────────────────────────

/// A raw scancode device file, opened lazily and non-blocking.
pub struct ExternalDevice {
    path: PathBuf,
    file: Option<File>,
}

impl ExternalDevice {
    pub fn new(path: PathBuf) -> Self {
        Self { path, file: None }
    }

    /// The device path this feed reads from.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn open_if_needed(&mut self) -> bool {
        if self.file.is_some() {
            return true;
        }

        let mut options = File::options();
        options.read(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.custom_flags(libc::O_NONBLOCK);
        }

        match options.open(&self.path) {
            Ok(file) => {
                info!(path = %self.path.display(), "scancode device opened");
                self.file = Some(file);
                true
            }
            Err(_) => false,
        }
    }

    fn poll(&mut self, out: &mut [u8]) -> FeedRead {
        if !self.open_if_needed() {
            return FeedRead::NotReady;
        }
        let Some(file) = self.file.as_mut() else {
            return FeedRead::NotReady;
        };

        match file.read(out) {
            Ok(0) => FeedRead::Empty,
            Ok(n) => FeedRead::Data(n),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => FeedRead::Empty,
            Err(e) => {
                warn!(path = %self.path.display(), "device read failed: {e}; reopening");
                self.file = None;
                FeedRead::NotReady
            }
        }
    }

    fn status(&self) -> String {
        if self.file.is_some() {
            format!("device: {}", self.path.display())
        } else {
            format!("device: waiting for {}", self.path.display())
        }
    }
}

// ── Embedded capture ──────────────────────────────────────────────────────────

/// The in-process capture subsystem plus its checked-out reader.
pub struct EmbeddedCapture {
    subsystem: CaptureSubsystem,
    reader: DeviceReader,
}

impl EmbeddedCapture {
    fn start(config: &MonitorConfig) -> Result<Self, FeedError> {
        let source: Box<dyn EventSource> = match config.capture.source.as_str() {
            "synthetic" => Box::new(SyntheticSource::with_interval(Duration::from_millis(
                config.capture.interval_ms,
            ))),
            "intercept" => {
                // A kernel build registers a real probe backend here; the
                // mock backend keeps the subsystem wiring intact on a stock
                // userspace build (the probe binds but nothing fires it).
                Box::new(InterceptSource::new(MockProbeBackend::attaching(&[
                    "kbd_event",
                ])))
            }
            other => return Err(FeedError::UnknownSource(other.to_string())),
        };

        let mut subsystem = CaptureSubsystem::start(config.capture.buffer_capacity, source)?;
        let reader = subsystem.open(OpenMode::NonBlocking)?;
        Ok(Self { subsystem, reader })
    }

    fn poll(&mut self, out: &mut [u8]) -> FeedRead {
        match self.reader.read(out) {
            Ok(0) => FeedRead::Empty,
            Ok(n) => FeedRead::Data(n),
            Err(DeviceError::WouldBlock) => FeedRead::Empty,
            Err(e) => {
                warn!("embedded capture read failed: {e}");
                FeedRead::Empty
            }
        }
    }

    fn source_description(&self) -> String {
        self.subsystem.source_description()
    }

    fn shutdown(self) {
        self.subsystem.shutdown();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
