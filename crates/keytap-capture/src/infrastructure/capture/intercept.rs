//! Intercept capture strategy: a dynamic entry probe on an existing
//! input-handling function.
//!
//! On start, attach is attempted against each candidate target symbol in a
//! fixed priority order — first the generic input-multiplexing entry point,
//! then the AT-keyboard-family entry point. The first successful attach
//! wins; once bound, the strategy emits nothing periodically and every byte
//! comes from intercepted calls. Exhausting the candidate list is an
//! initialization failure that the owning subsystem must roll back.
//!
//! The attached handler runs in the probed function's context: it extracts
//! one byte from the call's second argument (see
//! [`super::abi::scancode_from_entry`]), pushes it into the event buffer,
//! and does nothing else — no allocation, no blocking, no other observable
//! effect.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use super::abi::{scancode_from_entry, RegisterSnapshot};
use super::{CaptureError, EventSource};
use crate::infrastructure::event_buffer::ScanProducer;

/// Candidate target symbols, in attach priority order.
pub const DEFAULT_CANDIDATES: [&str; 2] = ["kbd_event", "atkbd_receive_byte"];

/// Callback invoked by a backend for every intercepted call.
pub type ProbeHandler = Arc<dyn Fn(&RegisterSnapshot) + Send + Sync>;

/// Error type for a single attach attempt.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The target symbol does not exist (or is not probeable) on this system.
    #[error("symbol `{0}` not found")]
    SymbolNotFound(String),

    /// The probing facility rejected the attach.
    #[error("probe attach rejected: {0}")]
    Rejected(String),
}

/// A live attachment returned by [`ProbeBackend::attach`].
pub trait ProbeHandle: Send {
    /// Detaches the probe. After this returns the handler is never invoked
    /// again.
    fn detach(&mut self);
}

/// Trait abstracting the dynamic probing facility.
///
/// A kernel build supplies an implementation backed by the platform's
/// function-entry probing mechanism; tests and headless builds use
/// [`super::mock::MockProbeBackend`].
pub trait ProbeBackend: Send {
    /// Attaches `handler` to the entry of `symbol`.
    fn attach(
        &mut self,
        symbol: &str,
        handler: ProbeHandler,
    ) -> Result<Box<dyn ProbeHandle>, ProbeError>;
}

struct BoundProbe {
    symbol: String,
    handle: Box<dyn ProbeHandle>,
}

/// Entry-probe scancode source with candidate fallback.
pub struct InterceptSource<B: ProbeBackend> {
    backend: B,
    candidates: Vec<String>,
    bound: Option<BoundProbe>,
}

impl<B: ProbeBackend> InterceptSource<B> {
    /// Creates a source over the [`DEFAULT_CANDIDATES`] list.
    pub fn new(backend: B) -> Self {
        Self::with_candidates(backend, DEFAULT_CANDIDATES)
    }

    /// Creates a source with a custom ordered candidate list.
    pub fn with_candidates<I, S>(backend: B, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            backend,
            candidates: candidates.into_iter().map(Into::into).collect(),
            bound: None,
        }
    }

    /// The symbol of the currently bound probe, if any.
    pub fn bound_symbol(&self) -> Option<&str> {
        self.bound.as_ref().map(|b| b.symbol.as_str())
    }
}

impl<B: ProbeBackend> EventSource for InterceptSource<B> {
    fn start(&mut self, producer: ScanProducer) -> Result<(), CaptureError> {
        if self.bound.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }

        // One handler shared across attach attempts; only the winning
        // candidate ever invokes it. Extraction failures are swallowed:
        // the handler must have no observable effect beyond the push.
        let handler: ProbeHandler = Arc::new(move |snapshot: &RegisterSnapshot| {
            if let Ok(byte) = scancode_from_entry(snapshot) {
                let _ = producer.push(byte);
            }
        });

        let candidates = self.candidates.clone();
        for symbol in &candidates {
            match self.backend.attach(symbol, Arc::clone(&handler)) {
                Ok(handle) => {
                    info!(symbol = %symbol, "entry probe attached");
                    self.bound = Some(BoundProbe {
                        symbol: symbol.clone(),
                        handle,
                    });
                    return Ok(());
                }
                Err(e) => {
                    warn!(symbol = %symbol, "probe attach failed: {e}");
                }
            }
        }

        Err(CaptureError::AllCandidatesFailed {
            tried: self.candidates.clone(),
        })
    }

    fn stop(&mut self) {
        if let Some(mut bound) = self.bound.take() {
            bound.handle.detach();
            info!(symbol = %bound.symbol, "entry probe detached");
        }
    }

    fn description(&self) -> String {
        match &self.bound {
            Some(bound) => format!("intercept ({})", bound.symbol),
            None => "intercept (unbound)".to_string(),
        }
    }
}

impl<B: ProbeBackend> Drop for InterceptSource<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::capture::mock::MockProbeBackend;
    use crate::infrastructure::event_buffer::bounded;

    #[test]
    fn test_first_candidate_wins_when_it_attaches() {
        // Arrange
        let backend = MockProbeBackend::attaching(&["kbd_event", "atkbd_receive_byte"]);
        let probe = backend.clone();
        let mut source = InterceptSource::new(backend);
        let (producer, _consumer) = bounded(16);

        // Act
        source.start(producer).expect("start must succeed");

        // Assert
        assert_eq!(source.bound_symbol(), Some("kbd_event"));
        assert_eq!(probe.attach_attempts(), vec!["kbd_event".to_string()]);
    }

    #[test]
    fn test_falls_back_to_next_candidate_on_attach_failure() {
        // Arrange: only the second candidate is attachable.
        let backend = MockProbeBackend::attaching(&["atkbd_receive_byte"]);
        let probe = backend.clone();
        let mut source = InterceptSource::new(backend);
        let (producer, _consumer) = bounded(16);

        // Act
        source.start(producer).expect("fallback must succeed");

        // Assert
        assert_eq!(source.bound_symbol(), Some("atkbd_receive_byte"));
        assert_eq!(
            probe.attach_attempts(),
            vec!["kbd_event".to_string(), "atkbd_receive_byte".to_string()]
        );
    }

    #[test]
    fn test_exhausting_all_candidates_is_an_initialization_error() {
        let backend = MockProbeBackend::rejecting_all();
        let mut source = InterceptSource::new(backend);
        let (producer, _consumer) = bounded(16);

        let result = source.start(producer);

        assert!(matches!(
            result,
            Err(CaptureError::AllCandidatesFailed { ref tried })
                if tried == &["kbd_event".to_string(), "atkbd_receive_byte".to_string()]
        ));
        assert_eq!(source.bound_symbol(), None);
    }

    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "x86"))]
    #[test]
    fn test_intercepted_calls_push_the_second_argument_byte() {
        // Arrange
        let backend = MockProbeBackend::attaching(&["kbd_event"]);
        let probe = backend.clone();
        let mut source = InterceptSource::new(backend);
        let (producer, mut consumer) = bounded(16);
        source.start(producer).expect("start must succeed");

        // Act: simulate two intercepted calls.
        probe.fire("kbd_event", &RegisterSnapshot::for_call(0x1000, 0x1E));
        probe.fire("kbd_event", &RegisterSnapshot::for_call(0x1000, 0x9E));

        // Assert
        let mut out = [0u8; 8];
        let n = consumer.pop_into(&mut out);
        assert_eq!(&out[..n], &[0x1E, 0x9E]);
    }

    #[test]
    fn test_stop_detaches_the_bound_probe() {
        let backend = MockProbeBackend::attaching(&["kbd_event"]);
        let probe = backend.clone();
        let mut source = InterceptSource::new(backend);
        let (producer, _consumer) = bounded(16);
        source.start(producer).expect("start must succeed");

        source.stop();

        assert_eq!(source.bound_symbol(), None);
        assert_eq!(probe.detached_symbols(), vec!["kbd_event".to_string()]);
    }

    #[test]
    fn test_description_reports_bound_target() {
        let backend = MockProbeBackend::attaching(&["atkbd_receive_byte"]);
        let mut source = InterceptSource::new(backend);
        assert_eq!(source.description(), "intercept (unbound)");

        let (producer, _consumer) = bounded(16);
        source.start(producer).expect("start must succeed");
        assert_eq!(source.description(), "intercept (atkbd_receive_byte)");
    }
}
