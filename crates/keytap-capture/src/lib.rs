//! # keytap-capture
//!
//! The capture subsystem: produces raw scancode bytes from one of two
//! interchangeable strategies, buffers them across the producer/consumer
//! boundary, and exposes them as a readable byte-stream device.
//!
//! ```text
//! EventSource (synthetic timer | intercept probe)
//!   └─ ScanProducer::push()       -- restricted context, never blocks
//!        └─ event buffer (bounded SPSC ring, lossy when full)
//!             └─ ScanConsumer / DeviceReader::read()  -- polled by consumer
//! ```
//!
//! The producer side runs in a restricted, interrupt-like context (a timer
//! thread tick or a probe entry handler): it must not allocate, must not
//! sleep, and its only shared-state interaction is the lock-free buffer
//! push. The consumer side polls; no wake-on-push is wired.

pub mod application;
pub mod infrastructure;

// Re-export the types callers wire together at startup.
pub use application::subsystem::CaptureSubsystem;
pub use infrastructure::capture::{CaptureError, EventSource};
pub use infrastructure::device::{DeviceError, DeviceReader, OpenMode};
pub use infrastructure::event_buffer::{bounded, ScanConsumer, ScanProducer, DEFAULT_CAPACITY};
