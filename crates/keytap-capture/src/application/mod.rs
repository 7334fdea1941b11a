//! Application layer for the capture subsystem.
//!
//! - **`subsystem`** – Owns the event buffer and the active capture
//!   strategy as one explicit lifecycle context: registration, rollback on
//!   bind failure, reader checkout, ordered teardown.

pub mod subsystem;
