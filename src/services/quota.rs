//! Quota reporter.
//!
//! Pure transform from a freshly fetched GitHub rate-limit response into the
//! display-ready shape consumers expect. No state; polling cadence is the
//! caller's concern.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::github::RateLimitResponse;

/// Display-ready quota snapshot pair
#[derive(Debug, Clone, Serialize)]
pub struct QuotaReport {
    pub search: SearchQuota,
    pub core: CoreQuota,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchQuota {
    pub limit: u64,
    pub remaining: u64,
    /// Epoch seconds
    pub reset: i64,
    /// Reset instant as RFC 3339
    pub reset_time: String,
    /// Milliseconds until reset, clamped at zero
    pub time_until_reset: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoreQuota {
    pub limit: u64,
    pub remaining: u64,
    pub reset: i64,
}

impl QuotaReport {
    /// Derives the report from the latest fetch at instant `now`.
    pub fn from_response(response: &RateLimitResponse, now: DateTime<Utc>) -> Self {
        let search = response.resources.search;
        let core = response.resources.core;

        let reset_ms = search.reset * 1000;
        let time_until_reset = (reset_ms - now.timestamp_millis()).max(0);
        let reset_time = DateTime::<Utc>::from_timestamp(search.reset, 0)
            .unwrap_or(now)
            .to_rfc3339();

        Self {
            search: SearchQuota {
                limit: search.limit,
                remaining: search.remaining,
                reset: search.reset,
                reset_time,
                time_until_reset,
            },
            core: CoreQuota {
                limit: core.limit,
                remaining: core.remaining,
                reset: core.reset,
            },
        }
    }
}
