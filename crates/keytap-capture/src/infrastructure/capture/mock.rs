//! Mock probe backend for unit testing.
//!
//! Allows tests to script which candidate symbols accept an attach and to
//! fire synthetic probe hits, without requiring any real function-entry
//! probing facility. Clones share state, so a test can keep one clone to
//! inspect/fire while the [`super::intercept::InterceptSource`] owns the
//! other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::abi::RegisterSnapshot;
use super::intercept::{ProbeBackend, ProbeError, ProbeHandle, ProbeHandler};

#[derive(Default)]
struct MockState {
    handlers: HashMap<String, ProbeHandler>,
    attach_attempts: Vec<String>,
    detached: Vec<String>,
}

/// A mock implementation of [`ProbeBackend`] with scripted attach outcomes.
#[derive(Clone, Default)]
pub struct MockProbeBackend {
    attachable: Vec<String>,
    state: Arc<Mutex<MockState>>,
}

impl MockProbeBackend {
    /// Creates a backend where exactly the given symbols attach successfully.
    pub fn attaching(symbols: &[&str]) -> Self {
        Self {
            attachable: symbols.iter().map(|s| s.to_string()).collect(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Creates a backend that rejects every attach attempt.
    pub fn rejecting_all() -> Self {
        Self::attaching(&[])
    }

    /// Simulates an intercepted call on `symbol`, invoking its handler.
    ///
    /// Panics if no probe is currently attached to `symbol` (never attached,
    /// or already detached).
    pub fn fire(&self, symbol: &str, snapshot: &RegisterSnapshot) {
        let handler = {
            let state = self.state.lock().expect("lock poisoned");
            state
                .handlers
                .get(symbol)
                .cloned()
                .unwrap_or_else(|| panic!("no probe attached to `{symbol}`"))
        };
        handler(snapshot);
    }

    /// Symbols attach was attempted on, in order.
    pub fn attach_attempts(&self) -> Vec<String> {
        self.state.lock().expect("lock poisoned").attach_attempts.clone()
    }

    /// Symbols whose probes have been detached, in order.
    pub fn detached_symbols(&self) -> Vec<String> {
        self.state.lock().expect("lock poisoned").detached.clone()
    }
}

impl ProbeBackend for MockProbeBackend {
    fn attach(
        &mut self,
        symbol: &str,
        handler: ProbeHandler,
    ) -> Result<Box<dyn ProbeHandle>, ProbeError> {
        let mut state = self.state.lock().expect("lock poisoned");
        state.attach_attempts.push(symbol.to_string());

        if !self.attachable.iter().any(|s| s.as_str() == symbol) {
            return Err(ProbeError::SymbolNotFound(symbol.to_string()));
        }

        state.handlers.insert(symbol.to_string(), handler);
        Ok(Box::new(MockProbeHandle {
            symbol: symbol.to_string(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockProbeHandle {
    symbol: String,
    state: Arc<Mutex<MockState>>,
}

impl ProbeHandle for MockProbeHandle {
    fn detach(&mut self) {
        let mut state = self.state.lock().expect("lock poisoned");
        if state.handlers.remove(&self.symbol).is_some() {
            state.detached.push(self.symbol.clone());
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
