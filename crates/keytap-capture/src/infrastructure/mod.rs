//! Infrastructure layer for the capture subsystem.
//!
//! Contains the shared event buffer, the capture strategies (synthetic
//! timer and intercept probe), and the device-reader adapter.
//!
//! **Dependency rule**: this layer may be depended on by `application`,
//! but must not import it.

pub mod capture;
pub mod device;
pub mod event_buffer;
