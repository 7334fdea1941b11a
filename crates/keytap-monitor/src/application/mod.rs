//! Application layer for the monitor.
//!
//! - **`session`** – Per-consumer decoding session: owns the decoder state
//!   and the visible transcript, and accounts countable characters per
//!   drained batch.

pub mod session;
