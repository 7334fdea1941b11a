//! Keytap monitor entry point.
//!
//! Wires together the scancode feed, the decoding session, and the stats
//! store, then runs the poll loop on the Tokio runtime.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()          -- TOML config + DEVICE_PATH override
//!  └─ ScancodeFeed           -- external device file, or embedded
//!                               capture subsystem (synthetic/intercept)
//!  └─ poll loop (every poll_interval_ms)
//!       ├─ rotate stats day if the date changed
//!       ├─ drain the feed → MonitorSession (decode + transcript)
//!       └─ record + save counters; degrade to "unavailable" on failure
//! ```
//!
//! There is no wake-on-arrival: the consumer polls on a fixed short
//! interval, and an unopenable device is simply retried on the next tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use keytap_monitor::application::session::MonitorSession;
use keytap_monitor::infrastructure::feed::{FeedRead, ScancodeFeed};
use keytap_monitor::infrastructure::storage::config::{self, MonitorConfig};
use keytap_monitor::infrastructure::storage::stats::{current_day, StatsStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging. Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("keytap monitor starting");

    // Load configuration; a broken config file falls back to defaults.
    let config = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("failed to load config, using defaults: {e}");
            MonitorConfig::default()
        }
    };

    // The feed is the only fatal initialisation point: an embedded
    // intercept subsystem that exhausts its candidate list must not come up
    // half-registered.
    let mut feed = ScancodeFeed::from_config(&config)?;

    let mut session = MonitorSession::new(config.monitor.transcript_limit);

    // ── Stats store (degrades to unavailable, never fatal) ───────────────────
    let mut stats = open_stats(&config);
    if stats.is_none() {
        warn!("keystroke counters unavailable");
    }

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    info!(status = %feed.status(), "keytap monitor ready");
    let mut last_status = feed.status();

    // ── Poll loop ─────────────────────────────────────────────────────────────
    let mut poll = tokio::time::interval(Duration::from_millis(config.monitor.poll_interval_ms));
    let mut buf = [0u8; 256];

    while running.load(Ordering::Relaxed) {
        poll.tick().await;

        // Day rollover first, so this tick's keystrokes land under the
        // right key.
        if let Some(mut store) = stats.take() {
            match store.rotate_day(&current_day()) {
                Ok(_) => stats = Some(store),
                Err(e) => warn!("keystroke counters unavailable: {e}"),
            }
        }

        // Drain everything buffered this tick.
        let mut added = 0u64;
        loop {
            match feed.poll(&mut buf) {
                FeedRead::Data(n) => added += session.ingest(&buf[..n]),
                FeedRead::Empty | FeedRead::NotReady => break,
            }
        }

        if added > 0 {
            if let Some(mut store) = stats.take() {
                store.record(added);
                match store.save() {
                    Ok(()) => {
                        info!(
                            total = store.total(),
                            today = store.day_count(),
                            transcript = %session.transcript(),
                            "keystrokes"
                        );
                        stats = Some(store);
                    }
                    Err(e) => warn!("keystroke counters unavailable: {e}"),
                }
            } else {
                info!(transcript = %session.transcript(), "keystrokes (counters unavailable)");
            }
        }

        // Surface feed transitions (device appearing/vanishing) as status
        // lines only.
        let status = feed.status();
        if status != last_status {
            info!(status = %status, "feed status changed");
            last_status = status;
        }
    }

    // ── Shutdown ──────────────────────────────────────────────────────────────
    if let Some(store) = stats.as_ref() {
        if let Err(e) = store.save() {
            error!("final stats save failed: {e}");
        }
    }
    feed.shutdown();

    info!("keytap monitor stopped");
    Ok(())
}

/// Opens the stats store at the configured (or platform-default) path.
///
/// Any failure — unresolvable data directory, unreadable file — returns
/// `None`: the counters display as unavailable while capture and decoding
/// continue.
fn open_stats(config: &MonitorConfig) -> Option<StatsStore> {
    let path = match &config.stats.path {
        Some(path) => path.clone(),
        None => match config::default_stats_path() {
            Ok(path) => path,
            Err(e) => {
                warn!("no stats location: {e}");
                return None;
            }
        },
    };

    if let Some(dir) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!("cannot create stats directory {}: {e}", dir.display());
            return None;
        }
    }

    match StatsStore::open(&path, &current_day()) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("cannot open stats file: {e}");
            None
        }
    }
}
