//! Timer-driven synthetic scancode source.
//!
//! Advances a cursor through a fixed cyclic scancode sequence, pushing one
//! byte per tick from a dedicated timer thread. The emission is fully
//! deterministic, which makes this the demo/simulation strategy when no
//! real hook can bind.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info};

use super::{CaptureError, EventSource};
use crate::infrastructure::event_buffer::ScanProducer;

/// The fixed 16-entry demo cycle: decodes to `hello world 123\n`.
pub const DEMO_SEQUENCE: [u8; 16] = [
    0x23, 0x12, 0x26, 0x26, 0x18, 0x39, 0x11, 0x18, 0x13, 0x26, 0x20, 0x39, 0x02, 0x03, 0x04,
    0x1C,
];

/// Default tick interval between emitted bytes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(120);

/// Periodic synthetic scancode generator.
pub struct SyntheticSource {
    interval: Duration,
    sequence: Arc<[u8]>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SyntheticSource {
    /// Creates a source emitting [`DEMO_SEQUENCE`] every
    /// [`DEFAULT_INTERVAL`].
    pub fn new() -> Self {
        Self::with_interval(DEFAULT_INTERVAL)
    }

    /// Creates a source emitting [`DEMO_SEQUENCE`] at a custom interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self::with_sequence(interval, DEMO_SEQUENCE.to_vec())
    }

    /// Creates a source with a custom cyclic sequence.
    ///
    /// # Panics
    ///
    /// Panics if `sequence` is empty.
    pub fn with_sequence(interval: Duration, sequence: Vec<u8>) -> Self {
        assert!(!sequence.is_empty(), "cyclic sequence must be non-empty");
        Self {
            interval,
            sequence: sequence.into(),
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// The configured tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for SyntheticSource {
    fn start(&mut self, producer: ScanProducer) -> Result<(), CaptureError> {
        if self.worker.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }

        self.running.store(true, Ordering::Relaxed);
        let running = Arc::clone(&self.running);
        let sequence = Arc::clone(&self.sequence);
        let interval = self.interval;

        let worker = thread::Builder::new()
            .name("keytap-synthetic".to_string())
            .spawn(move || {
                let mut cursor = 0usize;
                while running.load(Ordering::Relaxed) {
                    thread::sleep(interval);
                    if !running.load(Ordering::Relaxed) {
                        break;
                    }
                    // Full buffer: the byte is silently dropped, by contract.
                    let _ = producer.push(sequence[cursor]);
                    cursor = (cursor + 1) % sequence.len();
                }
                debug!("synthetic source thread exiting");
            })
            .map_err(|e| CaptureError::ThreadSpawn(e.to_string()))?;

        self.worker = Some(worker);
        info!(interval_ms = self.interval.as_millis() as u64, "synthetic scancode source started");
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            worker.join().ok();
            info!("synthetic scancode source stopped");
        }
    }

    fn description(&self) -> String {
        format!("synthetic ({} ms tick)", self.interval.as_millis())
    }
}

impl Drop for SyntheticSource {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
