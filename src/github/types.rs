//! GitHub REST API wire types.
//!
//! Only the fields this service consumes are modeled; serde ignores the rest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository as returned by the search endpoint.
///
/// Immutable once fetched; re-fetched on every query, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: RepositoryOwner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
}

/// Response shape of `GET /search/repositories`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<Repository>,
}

/// One rate-limit namespace: ceiling, remaining calls, reset instant
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitInfo {
    pub limit: u64,
    pub remaining: u64,
    /// Epoch seconds
    pub reset: i64,
    #[serde(default)]
    pub used: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateLimitResources {
    pub core: RateLimitInfo,
    pub search: RateLimitInfo,
}

/// Response shape of `GET /rate_limit`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateLimitResponse {
    pub resources: RateLimitResources,
}
