//! Short-lived cache in front of the `clients` query.
//!
//! Rapid UI refreshes (open, cycle, re-render) would otherwise spawn one
//! `hyprctl` per refresh.  The cache holds exactly one raw response and the
//! instant it was captured; there is no eviction policy beyond the TTL.

use std::cell::RefCell;
use std::time::{Duration, Instant};

/// Default staleness window.
pub const DEFAULT_TTL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
struct Snapshot {
    raw: String,
    captured: Instant,
}

/// Single-value, time-bounded cache of a raw query response.
#[derive(Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    snapshot: RefCell<Option<Snapshot>>,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            snapshot: RefCell::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached response if it is younger than the TTL, otherwise
    /// call `fetch` and store what it returns.
    ///
    /// A `None` from `fetch` is passed through and leaves the previous
    /// snapshot in place.
    pub fn get_or_fetch<F>(&self, fetch: F) -> Option<String>
    where
        F: FnOnce() -> Option<String>,
    {
        self.get_or_fetch_at(Instant::now(), fetch)
    }

    /// [`get_or_fetch`](Self::get_or_fetch) with an explicit clock reading.
    pub fn get_or_fetch_at<F>(&self, now: Instant, fetch: F) -> Option<String>
    where
        F: FnOnce() -> Option<String>,
    {
        if let Some(snap) = self.snapshot.borrow().as_ref() {
            if now.saturating_duration_since(snap.captured) < self.ttl {
                return Some(snap.raw.clone());
            }
        }

        let raw = fetch()?;
        *self.snapshot.borrow_mut() = Some(Snapshot {
            raw: raw.clone(),
            captured: now,
        });
        Some(raw)
    }

    /// Forget the stored response so the next request re-queries.
    pub fn invalidate(&self) {
        self.snapshot.borrow_mut().take();
    }
}
