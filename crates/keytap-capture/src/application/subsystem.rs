//! Capture subsystem lifecycle.
//!
//! One [`CaptureSubsystem`] owns the buffer pair and the active source for
//! its whole lifetime, replacing module-global buffer/timer state with an
//! explicitly-owned context passed by reference to every operation.
//!
//! Startup order: the reader endpoint (the "device registration") is
//! created first, then the source binds. If the source fails to bind —
//! typically the intercept strategy exhausting its candidate list — the
//! endpoint is rolled back before the error is returned, so no partial
//! registration is ever observable.
//!
//! Shutdown order: the source is stopped (hook detached, timer joined)
//! before the buffer storage can be freed.

use tracing::{error, info};

use crate::infrastructure::capture::{CaptureError, EventSource};
use crate::infrastructure::device::{DeviceReader, OpenMode};
use crate::infrastructure::event_buffer::{self, ScanConsumer};

/// Owned lifecycle context for one capture pipeline instance.
pub struct CaptureSubsystem {
    source: Box<dyn EventSource>,
    /// Present until the single reader is checked out.
    reader_slot: Option<ScanConsumer>,
}

impl CaptureSubsystem {
    /// Creates the event buffer and binds `source` to it.
    ///
    /// # Errors
    ///
    /// Returns the source's bind error after rolling back the buffer
    /// registration; nothing of the failed subsystem remains visible.
    pub fn start(
        capacity: usize,
        mut source: Box<dyn EventSource>,
    ) -> Result<Self, CaptureError> {
        let (producer, consumer) = event_buffer::bounded(capacity);

        if let Err(e) = source.start(producer) {
            error!("capture source failed to bind: {e}");
            // Roll back the registration: the consumer endpoint dies here,
            // before the error becomes visible to the caller.
            drop(consumer);
            return Err(e);
        }

        info!(
            capacity,
            source = %source.description(),
            "capture subsystem started"
        );
        Ok(Self {
            source,
            reader_slot: Some(consumer),
        })
    }

    /// Checks out the device reader in the requested mode.
    ///
    /// The subsystem supports a single consumer at a time; a second call
    /// returns [`CaptureError::ReaderBusy`].
    pub fn open(&mut self, mode: OpenMode) -> Result<DeviceReader, CaptureError> {
        match self.reader_slot.take() {
            Some(consumer) => Ok(DeviceReader::new(consumer, mode)),
            None => Err(CaptureError::ReaderBusy),
        }
    }

    /// The active source's status description.
    pub fn source_description(&self) -> String {
        self.source.description()
    }

    /// Tears the subsystem down: the source is stopped (and any attached
    /// hook detached) before the buffer storage goes away.
    pub fn shutdown(mut self) {
        self.source.stop();
        info!("capture subsystem shut down");
    }
}

impl Drop for CaptureSubsystem {
    fn drop(&mut self) {
        // Also covers the non-shutdown path; EventSource::stop is
        // idempotent.
        self.source.stop();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::capture::intercept::InterceptSource;
    use crate::infrastructure::capture::mock::MockProbeBackend;
    use crate::infrastructure::capture::synthetic::SyntheticSource;
    use std::time::Duration;

    #[test]
    fn test_start_with_synthetic_source_succeeds() {
        let source = SyntheticSource::with_interval(Duration::from_millis(50));

        let subsystem = CaptureSubsystem::start(64, Box::new(source));

        assert!(subsystem.is_ok());
        subsystem.unwrap().shutdown();
    }

    #[test]
    fn test_start_rolls_back_when_no_candidate_binds() {
        // Arrange
        let backend = MockProbeBackend::rejecting_all();
        let source = InterceptSource::new(backend);

        // Act
        let result = CaptureSubsystem::start(64, Box::new(source));

        // Assert
        assert!(matches!(
            result,
            Err(CaptureError::AllCandidatesFailed { .. })
        ));
    }

    #[test]
    fn test_only_one_reader_can_be_checked_out() {
        let source = SyntheticSource::with_interval(Duration::from_millis(50));
        let mut subsystem = CaptureSubsystem::start(64, Box::new(source)).expect("start");

        let first = subsystem.open(OpenMode::NonBlocking);
        let second = subsystem.open(OpenMode::NonBlocking);

        assert!(first.is_ok());
        assert!(matches!(second, Err(CaptureError::ReaderBusy)));
        subsystem.shutdown();
    }

    #[test]
    fn test_shutdown_detaches_the_bound_probe_before_teardown() {
        // Arrange
        let backend = MockProbeBackend::attaching(&["kbd_event"]);
        let probe = backend.clone();
        let source = InterceptSource::new(backend);
        let subsystem = CaptureSubsystem::start(64, Box::new(source)).expect("start");
        assert_eq!(subsystem.source_description(), "intercept (kbd_event)");

        // Act
        subsystem.shutdown();

        // Assert
        assert_eq!(probe.detached_symbols(), vec!["kbd_event".to_string()]);
    }

    #[test]
    fn test_drop_without_shutdown_still_stops_the_source() {
        let backend = MockProbeBackend::attaching(&["kbd_event"]);
        let probe = backend.clone();

        {
            let source = InterceptSource::new(backend);
            let _subsystem = CaptureSubsystem::start(64, Box::new(source)).expect("start");
        }

        assert_eq!(probe.detached_symbols(), vec!["kbd_event".to_string()]);
    }
}
