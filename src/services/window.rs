//! Bounded time-bucketed counter.
//!
//! Append-only sequence of timestamped events that answers "how many events
//! fall within the last W of now". Pruning is eager on every write, so storage
//! never grows unbounded between writes. Methods take an explicit `now` so the
//! clock is injectable; `_at`-less wrappers use `Utc::now()`.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};

/// Sliding-window event log with payloads of type `T`
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    window: Duration,
    entries: VecDeque<(DateTime<Utc>, T)>,
}

impl<T> SlidingWindow<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: VecDeque::new(),
        }
    }

    /// Rehydrates a window from persisted entries.
    ///
    /// Entries are expected in chronological order (they are appended at event
    /// time, so persisted order is insertion order). Out-of-window entries are
    /// dropped on the next write.
    pub fn from_entries(
        window: Duration,
        entries: impl IntoIterator<Item = (DateTime<Utc>, T)>,
    ) -> Self {
        Self {
            window,
            entries: entries.into_iter().collect(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Appends an event at `now`, then prunes everything older than `now − W`.
    pub fn record_at(&mut self, now: DateTime<Utc>, value: T) {
        self.entries.push_back((now, value));
        self.prune(now);
    }

    pub fn record(&mut self, value: T) {
        self.record_at(Utc::now(), value);
    }

    /// Events with timestamp within `[now − W, now]`.
    pub fn count_recent_at(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.window;
        self.entries.iter().filter(|(at, _)| *at >= cutoff).count()
    }

    pub fn count_recent(&self) -> usize {
        self.count_recent_at(Utc::now())
    }

    /// `max(0, cap − count_recent)`
    pub fn remaining_budget_at(&self, now: DateTime<Utc>, cap: usize) -> usize {
        cap.saturating_sub(self.count_recent_at(now))
    }

    pub fn remaining_budget(&self, cap: usize) -> usize {
        self.remaining_budget_at(Utc::now(), cap)
    }

    /// When the oldest in-window event ages out; `now` when nothing is pending.
    pub fn next_reset_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let cutoff = now - self.window;
        self.entries
            .iter()
            .map(|(at, _)| *at)
            .find(|at| *at >= cutoff)
            .map(|oldest| oldest + self.window)
            .unwrap_or(now)
    }

    pub fn next_reset(&self) -> DateTime<Utc> {
        self.next_reset_at(Utc::now())
    }

    /// Stored entries, oldest first. For persistence.
    pub fn entries(&self) -> impl Iterator<Item = &(DateTime<Utc>, T)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        let cutoff = now - self.window;
        while let Some((at, _)) = self.entries.front() {
            if *at < cutoff {
                self.entries.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn hour() -> Duration {
        Duration::hours(1)
    }

    #[test]
    fn count_tracks_events_within_window() {
        let mut w = SlidingWindow::new(hour());
        w.record_at(t(0), ());
        w.record_at(t(10), ());
        w.record_at(t(20), ());

        assert_eq!(w.count_recent_at(t(20)), 3);
        // an hour and a bit later, the first two have aged out
        assert_eq!(w.count_recent_at(t(3615)), 1);
    }

    #[test]
    fn record_prunes_expired_entries_from_storage() {
        let mut w = SlidingWindow::new(hour());
        w.record_at(t(0), ());
        w.record_at(t(10), ());
        // writing two hours later must evict both old entries
        w.record_at(t(7200), ());

        assert_eq!(w.len(), 1);
        assert_eq!(w.count_recent_at(t(7200)), 1);
    }

    #[test]
    fn remaining_budget_saturates_at_zero() {
        let mut w = SlidingWindow::new(hour());
        for i in 0..5 {
            w.record_at(t(i), ());
        }

        assert_eq!(w.remaining_budget_at(t(5), 3), 0);
        assert_eq!(w.remaining_budget_at(t(5), 10), 5);
    }

    #[test]
    fn budget_recovers_as_window_slides() {
        let mut w = SlidingWindow::new(hour());
        w.record_at(t(0), ());
        w.record_at(t(30), ());

        assert_eq!(w.remaining_budget_at(t(30), 2), 0);
        // oldest entry ages out at t(3600)
        assert_eq!(w.remaining_budget_at(t(3601), 2), 1);
        assert_eq!(w.remaining_budget_at(t(3631), 2), 2);
    }

    #[test]
    fn next_reset_is_oldest_in_window_plus_w() {
        let mut w = SlidingWindow::new(hour());
        w.record_at(t(100), ());
        w.record_at(t(200), ());

        assert_eq!(w.next_reset_at(t(200)), t(100) + hour());
        // once the first entry has aged out, reset follows the second
        assert_eq!(w.next_reset_at(t(3701)), t(200) + hour());
    }

    #[test]
    fn next_reset_is_now_when_empty() {
        let w: SlidingWindow<()> = SlidingWindow::new(hour());
        assert_eq!(w.next_reset_at(t(42)), t(42));
    }

    #[test]
    fn from_entries_rehydrates_state() {
        let w = SlidingWindow::from_entries(hour(), vec![(t(0), "a"), (t(100), "b")]);
        assert_eq!(w.len(), 2);
        assert_eq!(w.count_recent_at(t(100)), 2);
        assert_eq!(w.count_recent_at(t(3650)), 1);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn count_matches_in_window_events(offsets in proptest::collection::vec(0i64..10_000, 1..50)) {
                let mut sorted = offsets.clone();
                sorted.sort_unstable();

                let mut w = SlidingWindow::new(hour());
                for &off in &sorted {
                    w.record_at(t(off), ());
                }

                let now = t(*sorted.last().unwrap());
                let cutoff = now - hour();
                let expected = sorted.iter().filter(|&&off| t(off) >= cutoff).count();
                prop_assert_eq!(w.count_recent_at(now), expected);
            }

            #[test]
            fn storage_never_retains_expired_entries(offsets in proptest::collection::vec(0i64..100_000, 1..50)) {
                let mut sorted = offsets.clone();
                sorted.sort_unstable();

                let mut w = SlidingWindow::new(hour());
                for &off in &sorted {
                    w.record_at(t(off), ());
                }

                let now = t(*sorted.last().unwrap());
                let cutoff = now - hour();
                prop_assert!(w.entries().all(|(at, _)| *at >= cutoff));
            }

            #[test]
            fn budget_is_monotone_within_a_fixed_instant(n in 1usize..40) {
                let mut w = SlidingWindow::new(hour());
                let mut last = w.remaining_budget_at(t(0), 30);
                for i in 0..n {
                    w.record_at(t(i as i64), ());
                    let next = w.remaining_budget_at(t(i as i64), 30);
                    prop_assert!(next <= last);
                    last = next;
                }
            }
        }
    }
}
