//! Local advisory rate limiter.
//!
//! Pre-emptively blocks upstream search calls once a local rolling-hour budget
//! is exhausted, independent of what GitHub's own quota reports. Advisory
//! only: a courtesy throttle, not a correctness mechanism. State lives in an
//! injected key-value store, so concurrent processes each enforce their own
//! budget without coordination.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::window::SlidingWindow;

/// Storage key for the serialized usage history
const USAGE_KEY: &str = "namesentry_api_usage";

/// String key-value store capability.
///
/// Keeps the limiter testable without a real storage backend.
pub trait Storage: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// Process-resident storage backend
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}

/// One attempted upstream call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageRecord {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub endpoint: String,
    /// Remote quota remaining at the time of the call
    pub remaining: u64,
}

/// Advisory throttle over a sliding window of usage records
pub struct LocalRateLimiter {
    storage: Box<dyn Storage>,
    cap: usize,
    window: Duration,
}

impl LocalRateLimiter {
    pub fn new(storage: Box<dyn Storage>, cap: usize, window: Duration) -> Self {
        Self {
            storage,
            cap,
            window,
        }
    }

    /// True iff there is local budget left for another upstream call.
    pub fn can_proceed(&self) -> bool {
        self.can_proceed_at(Utc::now())
    }

    pub fn can_proceed_at(&self, now: DateTime<Utc>) -> bool {
        self.load().remaining_budget_at(now, self.cap) > 0
    }

    /// Appends a usage record and persists the pruned history.
    pub fn record_attempt(&mut self, endpoint: &str, quota_remaining: u64) {
        self.record_attempt_at(Utc::now(), endpoint, quota_remaining);
    }

    pub fn record_attempt_at(&mut self, now: DateTime<Utc>, endpoint: &str, quota_remaining: u64) {
        let mut window = self.load();
        window.record_at(
            now,
            UsageRecord {
                timestamp: now.timestamp_millis(),
                endpoint: endpoint.to_string(),
                remaining: quota_remaining,
            },
        );
        self.store(&window);
    }

    /// Calls left within the current window.
    pub fn remaining(&self) -> usize {
        self.remaining_at(Utc::now())
    }

    pub fn remaining_at(&self, now: DateTime<Utc>) -> usize {
        self.load().remaining_budget_at(now, self.cap)
    }

    /// When the oldest counted call ages out; `now` when nothing is counted.
    pub fn next_reset(&self) -> DateTime<Utc> {
        self.next_reset_at(Utc::now())
    }

    pub fn next_reset_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.load().next_reset_at(now)
    }

    /// Usage history as currently persisted.
    pub fn usage_history(&self) -> Vec<UsageRecord> {
        match self.storage.get(USAGE_KEY) {
            Some(raw) => parse_usage(&raw).unwrap_or_default(),
            None => Vec::new(),
        }
    }

    fn load(&self) -> SlidingWindow<UsageRecord> {
        let records = self.usage_history();
        SlidingWindow::from_entries(
            self.window,
            records.into_iter().filter_map(|r| {
                DateTime::<Utc>::from_timestamp_millis(r.timestamp).map(|at| (at, r))
            }),
        )
    }

    fn store(&mut self, window: &SlidingWindow<UsageRecord>) {
        let records: Vec<&UsageRecord> = window.entries().map(|(_, r)| r).collect();
        match serde_json::to_string(&records) {
            Ok(encoded) => self.storage.set(USAGE_KEY, encoded),
            Err(e) => log::error!("Failed to encode usage history: {}", e),
        }
    }
}

/// Fallible parse of the persisted record list.
///
/// Recovery policy on corrupt data is explicit at the call site: fall back to
/// an empty history, never surface the failure.
fn parse_usage(raw: &str) -> Result<Vec<UsageRecord>, serde_json::Error> {
    serde_json::from_str(raw).inspect_err(|e| {
        log::warn!("Corrupt usage history, resetting to empty: {}", e);
    })
}
