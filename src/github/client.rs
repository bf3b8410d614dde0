//! Authenticated GitHub REST client.
//!
//! Issues repository searches and rate-limit polls. The search endpoint fuzzy
//! matches, so exact-name lookups post-filter for true equality.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Serialize;

use crate::config::GithubConfig;
use crate::error::{AppError, AppResult};

use super::types::{RateLimitResponse, Repository, SearchResponse};

/// Candidates fetched per exact-name search before local filtering
const EXACT_SEARCH_PAGE_SIZE: u8 = 30;

/// Sort field for repository searches
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Stars,
    Forks,
    Updated,
}

/// Sort direction
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Query parameters for `search_repositories`
#[derive(Debug, Clone, Serialize)]
pub struct SearchOptions {
    pub sort: SortField,
    pub order: SortOrder,
    pub per_page: u8,
    pub page: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            sort: SortField::Stars,
            order: SortOrder::Desc,
            per_page: 10,
            page: 1,
        }
    }
}

/// GitHub API client with bearer authentication and a global request timeout
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    base_url: String,
}

impl GithubClient {
    /// Creates a client from configuration.
    ///
    /// Returns a configuration error when no token is present; callers surface
    /// that without attempting any network call.
    pub fn new(config: &GithubConfig) -> AppResult<Self> {
        let token = config
            .token
            .as_deref()
            .ok_or_else(|| AppError::Configuration("GitHub token not configured".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| AppError::Configuration(format!("Invalid GitHub token: {}", e)))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("namesentry/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(AppError::Network)?;

        Ok(Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Searches repositories with the given query and options.
    pub async fn search_repositories(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> AppResult<SearchResponse> {
        let url = format!("{}/search/repositories", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .query(options)
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Fetches the live quota for all namespaces.
    pub async fn get_rate_limit(&self) -> AppResult<RateLimitResponse> {
        let url = format!("{}/rate_limit", self.base_url);
        let response = self.client.get(&url).send().await?;

        Self::decode(response).await
    }

    /// Finds repositories whose name equals `name` case-insensitively.
    ///
    /// Two phases: a broad name-scoped query sorted by stars (the remote
    /// endpoint performs substring matching), then a mandatory local filter
    /// down to true equality.
    pub async fn search_exact_repo_name(&self, name: &str) -> AppResult<Vec<Repository>> {
        let query = format!("\"{}\" in:name", name);
        let options = SearchOptions {
            per_page: EXACT_SEARCH_PAGE_SIZE,
            ..SearchOptions::default()
        };
        let response = self.search_repositories(&query, &options).await?;

        Ok(filter_exact_matches(response.items, name))
    }

    /// Decodes a response, classifying non-success statuses.
    ///
    /// 403/429 mean quota exhaustion and become a distinct rate-limited error
    /// so callers can answer with a retry-later message instead of a generic
    /// failure.
    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();

        if status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            log::warn!("GitHub quota exhausted: {} - {}", status, body);
            return Err(AppError::QuotaExceeded);
        }

        Err(AppError::RemoteApi {
            status: status.as_u16(),
            body,
        })
    }
}

/// Keeps only repositories whose name equals `name` under case folding.
fn filter_exact_matches(items: Vec<Repository>, name: &str) -> Vec<Repository> {
    let wanted = name.to_lowercase();
    items
        .into_iter()
        .filter(|repo| repo.name.to_lowercase() == wanted)
        .collect()
}
