//! Keystroke counter persistence.
//!
//! The stats file is plain text, one `key=value` per line. Two keys are
//! live at any time: `total` (running lifetime count) and one
//! 10-character `YYYY-MM-DD` key for the active calendar day. Every other
//! line — previous days' keys, comments, anything unparseable — is
//! preserved verbatim across rewrites, and a rewrite always places `total`
//! first and the active day second.
//!
//! Failures here must never take down capture or decoding: the monitor
//! drops its [`StatsStore`] and shows the counters as unavailable instead.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::debug;

/// Error type for stats file operations.
#[derive(Debug, Error)]
pub enum StatsError {
    /// The day key is not a 10-character `YYYY-MM-DD` string.
    #[error("day key must be exactly 10 characters (YYYY-MM-DD), got `{0}`")]
    InvalidDayKey(String),

    /// A file system I/O error occurred.
    #[error("I/O error accessing stats at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persistent keystroke counters for one calendar day plus the lifetime
/// total.
#[derive(Debug)]
pub struct StatsStore {
    path: PathBuf,
    day: String,
    total: u64,
    day_count: u64,
}

impl StatsStore {
    /// Opens (or initialises) the counters for `day`.
    ///
    /// A missing file is not an error: both counters start at zero and the
    /// file is created on the first [`save`].
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::InvalidDayKey`] for a malformed day string and
    /// [`StatsError::Io`] for read failures other than "not found".
    ///
    /// [`save`]: StatsStore::save
    pub fn open(path: impl Into<PathBuf>, day: &str) -> Result<Self, StatsError> {
        if day.chars().count() != 10 {
            return Err(StatsError::InvalidDayKey(day.to_string()));
        }

        let mut store = Self {
            path: path.into(),
            day: day.to_string(),
            total: 0,
            day_count: 0,
        };

        match std::fs::read_to_string(&store.path) {
            Ok(content) => {
                for line in content.lines() {
                    let Some((key, value)) = parse_counter_line(line) else {
                        continue;
                    };
                    if key == "total" {
                        store.total = value;
                    } else if key == store.day {
                        store.day_count = value;
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %store.path.display(), "stats file absent, starting at zero");
            }
            Err(source) => {
                return Err(StatsError::Io {
                    path: store.path,
                    source,
                });
            }
        }

        Ok(store)
    }

    /// The lifetime count.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// The active day's count.
    pub fn day_count(&self) -> u64 {
        self.day_count
    }

    /// The active day key.
    pub fn day(&self) -> &str {
        &self.day
    }

    /// Adds `count` keystrokes to both counters.
    pub fn record(&mut self, count: u64) {
        self.total = self.total.saturating_add(count);
        self.day_count = self.day_count.saturating_add(count);
    }

    /// Rewrites the stats file: `total` first, the active day second, then
    /// every other existing line verbatim in its original order.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::Io`] on read or write failure.
    pub fn save(&self) -> Result<(), StatsError> {
        let mut other_lines = Vec::new();
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                for line in content.lines() {
                    if let Some((key, _)) = parse_counter_line(line) {
                        if key == "total" || key == self.day {
                            continue;
                        }
                    }
                    other_lines.push(line.to_string());
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(StatsError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        }

        let mut content = String::new();
        let _ = writeln!(content, "total={}", self.total);
        let _ = writeln!(content, "{}={}", self.day, self.day_count);
        for line in other_lines {
            let _ = writeln!(content, "{line}");
        }

        std::fs::write(&self.path, content).map_err(|source| StatsError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Handles day rollover: when `today` differs from the active day, the
    /// current counters are saved and the store re-opens under the new key
    /// (its day count restarting from whatever the file already holds for
    /// `today`, normally zero).
    ///
    /// Returns `true` when a rollover happened.
    pub fn rotate_day(&mut self, today: &str) -> Result<bool, StatsError> {
        if today == self.day {
            return Ok(false);
        }

        self.save()?;
        *self = Self::open(self.path.clone(), today)?;
        debug!(day = %self.day, "stats rolled over to a new day");
        Ok(true)
    }
}

/// Parses one `key=value` counter line.
///
/// Value parsing mirrors `strtoul`: optional leading whitespace, then a
/// digit run; trailing junk is ignored. A line with an empty key or no
/// digits is not a counter line (and is preserved verbatim on rewrite).
fn parse_counter_line(line: &str) -> Option<(&str, u64)> {
    let (key, rest) = line.split_once('=')?;
    if key.is_empty() {
        return None;
    }

    let digits = rest.trim_start();
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    digits[..end].parse().ok().map(|value| (key, value))
}

/// The current calendar day as a `YYYY-MM-DD` key.
pub fn current_day() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format_civil_date((secs / 86_400) as i64)
}

/// Formats a days-since-Unix-epoch count as `YYYY-MM-DD` (proleptic
/// Gregorian).
fn format_civil_date(days_since_epoch: i64) -> String {
    // Shift the epoch from 1970-01-01 to 0000-03-01, then decompose into
    // 400-year eras.
    let z = days_since_epoch + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let year_base = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if month <= 2 { year_base + 1 } else { year_base };

    format!("{year:04}-{month:02}-{day:02}")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_FILE: AtomicUsize = AtomicUsize::new(0);

    /// A unique throwaway path per test.
    fn temp_stats_path() -> PathBuf {
        let n = NEXT_FILE.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("keytap_stats_{}_{n}.txt", std::process::id()))
    }

    fn write_seed(path: &PathBuf) {
        std::fs::write(path, "total=3\n2025-01-07=2\n2025-01-06=1\n").expect("seed");
    }

    // ── open ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_open_missing_file_starts_at_zero() {
        let path = temp_stats_path();

        let store = StatsStore::open(&path, "2025-01-07").expect("open");

        assert_eq!(store.total(), 0);
        assert_eq!(store.day_count(), 0);
    }

    #[test]
    fn test_open_reads_total_and_matching_day() {
        // Arrange
        let path = temp_stats_path();
        write_seed(&path);

        // Act
        let store = StatsStore::open(&path, "2025-01-07").expect("open");

        // Assert
        assert_eq!(store.total(), 3);
        assert_eq!(store.day_count(), 2);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_open_ignores_other_days_counters() {
        let path = temp_stats_path();
        write_seed(&path);

        let store = StatsStore::open(&path, "2025-01-08").expect("open");

        assert_eq!(store.total(), 3);
        assert_eq!(store.day_count(), 0, "2025-01-07's count must not bleed in");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_open_rejects_malformed_day_key() {
        let path = temp_stats_path();

        let result = StatsStore::open(&path, "2025-1-7");

        assert!(matches!(result, Err(StatsError::InvalidDayKey(_))));
    }

    // ── record / save round trip ──────────────────────────────────────────────

    #[test]
    fn test_record_then_save_then_reopen_round_trips() {
        // Arrange (mirrors the original acceptance sequence).
        let path = temp_stats_path();
        write_seed(&path);
        let mut store = StatsStore::open(&path, "2025-01-07").expect("open");

        // Act
        store.record(4);
        assert_eq!((store.total(), store.day_count()), (7, 6));
        store.save().expect("save");
        let reopened = StatsStore::open(&path, "2025-01-07").expect("reopen");

        // Assert
        assert_eq!((reopened.total(), reopened.day_count()), (7, 6));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_save_orders_total_then_day_then_preserved_lines() {
        let path = temp_stats_path();
        write_seed(&path);
        let mut store = StatsStore::open(&path, "2025-01-07").expect("open");
        store.record(4);

        store.save().expect("save");

        let content = std::fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["total=7", "2025-01-07=6", "2025-01-06=1"]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_save_preserves_unrecognized_lines_verbatim() {
        // Arrange: comments and junk between counter lines.
        let path = temp_stats_path();
        std::fs::write(
            &path,
            "# rolled over weekly\ntotal=5\nnot a counter\n2025-01-07=5\nmood=good\n",
        )
        .expect("seed");
        let mut store = StatsStore::open(&path, "2025-01-07").expect("open");

        // Act
        store.record(1);
        store.save().expect("save");

        // Assert: replaced keys move to the front, everything else keeps
        // its relative order.
        let content = std::fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "total=6",
                "2025-01-07=6",
                "# rolled over weekly",
                "not a counter",
                "mood=good",
            ]
        );

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_save_creates_the_file_when_absent() {
        let path = temp_stats_path();
        let mut store = StatsStore::open(&path, "2025-01-07").expect("open");
        store.record(2);

        store.save().expect("save");

        let content = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(content, "total=2\n2025-01-07=2\n");

        std::fs::remove_file(&path).ok();
    }

    // ── Value parsing ─────────────────────────────────────────────────────────

    #[test]
    fn test_counter_value_parsing_mirrors_strtoul() {
        assert_eq!(parse_counter_line("total=12"), Some(("total", 12)));
        assert_eq!(parse_counter_line("total= 12"), Some(("total", 12)));
        assert_eq!(parse_counter_line("total=12abc"), Some(("total", 12)));
        assert_eq!(parse_counter_line("total=abc"), None);
        assert_eq!(parse_counter_line("=12"), None);
        assert_eq!(parse_counter_line("no equals sign"), None);
    }

    // ── Day rollover ──────────────────────────────────────────────────────────

    #[test]
    fn test_rotate_day_saves_old_day_and_restarts_count() {
        // Arrange
        let path = temp_stats_path();
        let mut store = StatsStore::open(&path, "2025-01-07").expect("open");
        store.record(5);

        // Act
        let rolled = store.rotate_day("2025-01-08").expect("rotate");

        // Assert
        assert!(rolled);
        assert_eq!(store.day(), "2025-01-08");
        assert_eq!(store.total(), 5, "lifetime total survives the rollover");
        assert_eq!(store.day_count(), 0, "the new day starts at zero");

        // Yesterday's key is preserved in the file.
        store.record(1);
        store.save().expect("save");
        let content = std::fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["total=6", "2025-01-08=1", "2025-01-07=5"]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_rotate_day_is_a_no_op_for_the_same_day() {
        let path = temp_stats_path();
        let mut store = StatsStore::open(&path, "2025-01-07").expect("open");

        let rolled = store.rotate_day("2025-01-07").expect("rotate");

        assert!(!rolled);
        assert!(!path.exists(), "no-op rollover must not touch the file");
    }

    // ── Day formatting ────────────────────────────────────────────────────────

    #[test]
    fn test_format_civil_date_known_values() {
        assert_eq!(format_civil_date(0), "1970-01-01");
        assert_eq!(format_civil_date(10_957), "2000-01-01");
        assert_eq!(format_civil_date(11_017), "2000-03-01");
        assert_eq!(format_civil_date(19_782), "2024-02-29");
        assert_eq!(format_civil_date(20_095), "2025-01-07");
    }

    #[test]
    fn test_current_day_is_a_valid_key() {
        let day = current_day();
        assert_eq!(day.len(), 10);
        assert_eq!(day.as_bytes()[4], b'-');
        assert_eq!(day.as_bytes()[7], b'-');
        // Round-trips through open().
        let path = temp_stats_path();
        assert!(StatsStore::open(&path, &day).is_ok());
    }
}
