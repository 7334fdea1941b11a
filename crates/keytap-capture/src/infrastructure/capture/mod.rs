//! Capture strategies for the event source.
//!
//! Two interchangeable producers push raw scancode bytes into the event
//! buffer:
//!
//! - [`synthetic::SyntheticSource`] — a periodic timer thread that walks a
//!   fixed cyclic scancode sequence. Deterministic; used for demos and
//!   whenever no real hook can bind.
//! - [`intercept::InterceptSource`] — attaches a dynamic entry probe to the
//!   first candidate target function that accepts it, and extracts one byte
//!   per intercepted call from the call's second argument (see
//!   [`abi::scancode_from_entry`]).
//!
//! Either way the producer callback runs in a restricted, non-blocking
//! context: it must complete in bounded short time and its only shared-state
//! interaction is the buffer push.
//!
//! # Testability
//!
//! The [`intercept::ProbeBackend`] trait allows unit tests to script attach
//! outcomes and fire synthetic probe hits without any real probing facility;
//! see [`mock::MockProbeBackend`].

use thiserror::Error;

use crate::infrastructure::event_buffer::ScanProducer;

pub mod abi;
pub mod intercept;
pub mod mock;
pub mod synthetic;

/// Error type for capture source operations.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Every candidate symbol in the intercept list failed to attach.
    #[error("no entry probe could be attached (tried {tried:?})")]
    AllCandidatesFailed { tried: Vec<String> },

    /// `start` was called on a source that is already running.
    #[error("capture source has already been started")]
    AlreadyStarted,

    /// The producer thread could not be spawned.
    #[error("failed to spawn capture thread: {0}")]
    ThreadSpawn(String),

    /// The subsystem's single device reader is already checked out.
    #[error("device reader is already checked out")]
    ReaderBusy,
}

/// Trait abstracting scancode byte production.
///
/// Exactly one source is active per subsystem. `start` hands the source the
/// producer endpoint of the event buffer; `stop` must halt all emission and
/// release whatever the strategy bound (timer thread, entry probe) before it
/// returns.
pub trait EventSource: Send {
    /// Starts producing into `producer`.
    fn start(&mut self, producer: ScanProducer) -> Result<(), CaptureError>;

    /// Stops the source and detaches/joins its resources. Idempotent.
    fn stop(&mut self);

    /// One-line human-readable description for the status display.
    fn description(&self) -> String;
}
