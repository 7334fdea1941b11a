//! Infrastructure layer for the monitor application.
//!
//! Contains OS-facing adapters: the scancode feed (external device file or
//! embedded capture subsystem) and file-system storage (config, stats).
//!
//! **Dependency rule**: this layer may depend on `application` and the
//! keytap library crates, but MUST NOT be imported by the `application`
//! layer.

pub mod feed;
pub mod storage;
