//! File-system storage for the monitor.
//!
//! - **`config`** – TOML configuration in the platform config directory.
//! - **`stats`** – plain-text `key=value` keystroke counters in the
//!   platform data directory.

pub mod config;
pub mod stats;
