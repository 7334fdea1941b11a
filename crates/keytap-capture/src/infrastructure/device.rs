//! Byte-stream device reader over the event buffer.
//!
//! Exposes the capture subsystem to its consumer as a readable device:
//! whatever is buffered is returned immediately (up to the requested
//! length), and an empty buffer is reported according to the open mode.
//!
//! In non-blocking mode an empty read is a would-block condition, distinct
//! from end-of-stream. In blocking mode an empty read currently returns
//! zero bytes — an end-of-stream-like result — rather than suspending the
//! caller; consumers poll and retry. Both behaviors are load-bearing for
//! the polling consumer and covered by tests.

use std::io;

use thiserror::Error;

use super::event_buffer::ScanConsumer;

/// Size of the staging chunk used when draining toward a writer, so that
/// no shared state is touched while the caller-facing write is in flight.
const STAGE_CHUNK: usize = 256;

/// How the device stream was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Empty reads return `Ok(0)`.
    Blocking,
    /// Empty reads return [`DeviceError::WouldBlock`].
    NonBlocking,
}

/// Error type for device read operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The buffer is empty and the stream is non-blocking. Retry later;
    /// this is not end-of-stream.
    #[error("no scancode data available")]
    WouldBlock,

    /// Copying captured bytes to the caller-provided destination failed.
    /// Distinct from both would-block and an empty read.
    #[error("failed to copy captured bytes to destination")]
    Io(#[from] io::Error),
}

/// Readable byte-stream view of the event buffer.
pub struct DeviceReader {
    consumer: ScanConsumer,
    mode: OpenMode,
}

impl DeviceReader {
    pub(crate) fn new(consumer: ScanConsumer, mode: OpenMode) -> Self {
        Self { consumer, mode }
    }

    /// The mode this stream was opened with.
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Reads up to `out.len()` bytes.
    ///
    /// Returns at least one byte whenever the buffer is non-empty (possibly
    /// fewer than requested). On an empty buffer the result depends on the
    /// open mode: `Err(WouldBlock)` when non-blocking, `Ok(0)` when
    /// blocking.
    pub fn read(&mut self, out: &mut [u8]) -> Result<usize, DeviceError> {
        let copied = self.consumer.pop_into(out);
        if copied == 0 && !out.is_empty() && self.mode == OpenMode::NonBlocking {
            return Err(DeviceError::WouldBlock);
        }
        Ok(copied)
    }

    /// Drains up to `max` bytes into `writer`.
    ///
    /// Bytes are staged through a fixed-size chunk so the shared buffer is
    /// never held across the caller-facing write. A writer failure surfaces
    /// as [`DeviceError::Io`]; bytes already staged when the failure occurs
    /// are lost, matching a failed copy-out.
    pub fn read_to_writer(
        &mut self,
        writer: &mut dyn io::Write,
        max: usize,
    ) -> Result<usize, DeviceError> {
        let mut staged = [0u8; STAGE_CHUNK];
        let mut copied = 0;

        while copied < max {
            let want = staged.len().min(max - copied);
            let n = self.consumer.pop_into(&mut staged[..want]);
            if n == 0 {
                break;
            }
            writer.write_all(&staged[..n])?;
            copied += n;
        }

        if copied == 0 && max > 0 && self.mode == OpenMode::NonBlocking {
            return Err(DeviceError::WouldBlock);
        }
        Ok(copied)
    }
}

impl io::Read for DeviceReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        DeviceReader::read(self, buf).map_err(|e| match e {
            DeviceError::WouldBlock => io::Error::from(io::ErrorKind::WouldBlock),
            DeviceError::Io(source) => source,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
