//! Visit analytics.
//!
//! Non-critical usage telemetry. Two counters share the day/window-bucketed
//! pattern: a process-wide one (reset on restart is accepted) and a
//! storage-backed lifetime counter with best-effort forwarding.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use super::rate_limit::Storage;

/// Days of per-day history kept by the process-wide counter
const RETENTION_DAYS: i64 = 7;

/// Storage key for the lifetime visit count
const VISITS_KEY: &str = "namesentry_visits";

/// Process-wide visit counters.
///
/// Lifetime total is monotonic and never pruned; the per-day map drops keys
/// older than seven days on every write.
#[derive(Debug, Default)]
pub struct VisitStats {
    total_visits: u64,
    daily: BTreeMap<NaiveDate, u64>,
}

/// Snapshot returned by `GET /analytics/visit`
#[derive(Debug, Serialize)]
pub struct VisitSnapshot {
    pub total_visits: u64,
    pub today_visits: u64,
    pub recent_days: BTreeMap<NaiveDate, u64>,
}

impl VisitStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all counts. Restart-equivalent; mainly for tests.
    pub fn reset(&mut self) {
        self.total_visits = 0;
        self.daily.clear();
    }

    pub fn record_visit(&mut self) {
        self.record_visit_at(Utc::now());
    }

    /// Counts one visit on the UTC calendar day of `now`, then prunes days
    /// older than the retention window.
    pub fn record_visit_at(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        self.total_visits += 1;
        *self.daily.entry(today).or_insert(0) += 1;

        let cutoff = today - Duration::days(RETENTION_DAYS);
        self.daily.retain(|day, _| *day >= cutoff);
    }

    pub fn total_visits(&self) -> u64 {
        self.total_visits
    }

    pub fn snapshot(&self) -> VisitSnapshot {
        self.snapshot_at(Utc::now())
    }

    pub fn snapshot_at(&self, now: DateTime<Utc>) -> VisitSnapshot {
        let today = now.date_naive();
        VisitSnapshot {
            total_visits: self.total_visits,
            today_visits: self.daily.get(&today).copied().unwrap_or(0),
            recent_days: self.daily.clone(),
        }
    }
}

/// Storage-backed lifetime visit counter.
///
/// A single monotonically increasing integer under a fixed key; an unparsable
/// stored value reads as zero.
pub struct VisitCounter {
    storage: Box<dyn Storage>,
}

impl VisitCounter {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn count(&self) -> u64 {
        self.storage
            .get(VISITS_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0)
    }

    /// Increments and persists the lifetime count, returning the new value.
    pub fn record_visit(&mut self) -> u64 {
        let count = self.count() + 1;
        self.storage.set(VISITS_KEY, count.to_string());
        count
    }
}

/// Best-effort, non-blocking forward of one visit to the analytics endpoint.
///
/// Detached task; failure is logged and swallowed. No caller awaits or
/// depends on the outcome.
pub fn forward_visit(client: reqwest::Client, url: String, payload: serde_json::Value) {
    tokio::spawn(async move {
        match client.post(&url).json(&payload).send().await {
            Ok(response) if !response.status().is_success() => {
                log::warn!("Visit forward rejected: HTTP {}", response.status());
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("Failed to forward visit: {}", e);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::rate_limit::MemoryStorage;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn day(offset: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + offset * 86_400, 0).unwrap()
    }

    #[test]
    fn visits_accumulate_per_day_and_in_total() {
        let mut stats = VisitStats::new();
        stats.record_visit_at(day(0));
        stats.record_visit_at(day(0));
        stats.record_visit_at(day(1));

        let snap = stats.snapshot_at(day(1));
        assert_eq!(snap.total_visits, 3);
        assert_eq!(snap.today_visits, 1);
        assert_eq!(snap.recent_days.len(), 2);
    }

    #[test]
    fn day_map_never_keeps_entries_older_than_retention() {
        let mut stats = VisitStats::new();
        stats.record_visit_at(day(0));
        stats.record_visit_at(day(10));

        let snap = stats.snapshot_at(day(10));
        assert_eq!(snap.recent_days.len(), 1);
        assert!(snap.recent_days.contains_key(&day(10).date_naive()));
        // lifetime total is never pruned
        assert_eq!(snap.total_visits, 2);
    }

    #[test]
    fn today_visits_is_zero_on_a_fresh_day() {
        let mut stats = VisitStats::new();
        stats.record_visit_at(day(0));

        let snap = stats.snapshot_at(day(1));
        assert_eq!(snap.today_visits, 0);
        assert_eq!(snap.total_visits, 1);
    }

    #[test]
    fn reset_clears_everything() {
        let mut stats = VisitStats::new();
        stats.record_visit_at(day(0));
        stats.reset();

        let snap = stats.snapshot_at(day(0));
        assert_eq!(snap.total_visits, 0);
        assert!(snap.recent_days.is_empty());
    }

    #[test]
    fn counter_increments_through_storage() {
        let mut counter = VisitCounter::new(Box::new(MemoryStorage::new()));
        assert_eq!(counter.count(), 0);
        assert_eq!(counter.record_visit(), 1);
        assert_eq!(counter.record_visit(), 2);
        assert_eq!(counter.count(), 2);
    }

    #[test]
    fn counter_recovers_from_corrupt_value() {
        let mut storage = MemoryStorage::new();
        storage.set(VISITS_KEY, "not-a-number".to_string());
        let mut counter = VisitCounter::new(Box::new(storage));

        assert_eq!(counter.count(), 0);
        assert_eq!(counter.record_visit(), 1);
    }
}
