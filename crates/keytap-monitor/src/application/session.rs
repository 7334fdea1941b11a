//! Per-consumer decoding session.
//!
//! Owns one [`ScancodeDecoder`] and the visible transcript it feeds. The
//! transcript mirrors what a user would see: decoded characters append,
//! backspace erases the last visible character, token text (`<SHIFT>` and
//! friends) appears literally, and only the trailing window is kept.

use keytap_core::{DecodedUnit, ScancodeDecoder};
use tracing::trace;

/// Default number of trailing characters the transcript retains.
pub const DEFAULT_TRANSCRIPT_LIMIT: usize = 200;

/// The visible text buffer built from decoded output.
#[derive(Debug)]
pub struct Transcript {
    text: String,
    limit: usize,
}

impl Transcript {
    /// Creates a transcript keeping at most `limit` trailing characters.
    pub fn new(limit: usize) -> Self {
        Self {
            text: String::new(),
            limit,
        }
    }

    /// Applies one decoded character: backspace erases, newline and
    /// everything else appends.
    pub fn apply_char(&mut self, ch: char) {
        if ch == '\x08' {
            self.text.pop();
        } else {
            self.text.push(ch);
        }

        if self.text.chars().count() > self.limit {
            // Keep the trailing window only.
            let excess = self.text.chars().count() - self.limit;
            self.text = self.text.chars().skip(excess).collect();
        }
    }

    /// Applies a decoded unit: characters go through [`apply_char`], token
    /// text is appended character by character.
    ///
    /// [`apply_char`]: Transcript::apply_char
    pub fn apply(&mut self, unit: &DecodedUnit) {
        match unit {
            DecodedUnit::Char(ch) => self.apply_char(*ch),
            DecodedUnit::Token(token) => {
                for ch in token.as_str().chars() {
                    self.apply_char(ch);
                }
            }
        }
    }

    /// The current visible text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// One decoding session: decoder state plus the transcript it renders into.
#[derive(Debug)]
pub struct MonitorSession {
    decoder: ScancodeDecoder,
    transcript: Transcript,
}

impl MonitorSession {
    /// Creates a session with a fresh decoder and an empty transcript.
    pub fn new(transcript_limit: usize) -> Self {
        Self {
            decoder: ScancodeDecoder::new(),
            transcript: Transcript::new(transcript_limit),
        }
    }

    /// Decodes a drained batch of raw bytes, updating the transcript.
    ///
    /// Returns how many countable characters the batch produced.
    pub fn ingest(&mut self, bytes: &[u8]) -> u64 {
        let mut added = 0;
        for &raw in bytes {
            if let Some(unit) = self.decoder.decode(raw) {
                added += u64::from(unit.counted());
                self.transcript.apply(&unit);
            }
        }
        if added > 0 {
            trace!(added, "counted characters in batch");
        }
        added
    }

    /// The current visible transcript.
    pub fn transcript(&self) -> &str {
        self.transcript.text()
    }

    /// Resets the decoder's modifier state, leaving the transcript intact.
    pub fn reset_decoder(&mut self) {
        self.decoder.reset();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
