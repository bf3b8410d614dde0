use std::sync::Mutex;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::github::{GithubClient, Repository};
use crate::services::LocalRateLimiter;

/// Query length bounds enforced before anything else happens
const MAX_QUERY_CHARS: usize = 100;

/// Endpoint identifier stored in usage records
const SEARCH_ENDPOINT: &str = "search/repositories";

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponseBody {
    pub query: String,
    pub results: Vec<Repository>,
    pub total_count: usize,
    pub rate_limit: RateLimitSummary,
}

#[derive(Debug, Serialize)]
pub struct RateLimitSummary {
    pub remaining: u64,
    pub limit: u64,
    pub reset: i64,
}

/// GET /search?q=<name>
///
/// Checks whether `q` is taken as a repository name. The local limiter gates
/// issuance before any upstream call; the exact-name search and the quota
/// fetch then run concurrently and are joined into one response.
pub async fn search(
    github: web::Data<Option<GithubClient>>,
    limiter: web::Data<Mutex<LocalRateLimiter>>,
    params: web::Query<SearchParams>,
) -> AppResult<HttpResponse> {
    let query = validate_query(params.into_inner().q)?;

    let client = github
        .as_ref()
        .as_ref()
        .ok_or_else(|| AppError::Configuration("GitHub token not configured".to_string()))?;

    {
        let limiter = limiter
            .lock()
            .map_err(|_| AppError::Internal("rate limiter lock poisoned".to_string()))?;
        if !limiter.can_proceed() {
            return Err(AppError::QuotaExceeded);
        }
    }

    let (results, rate_limit) = tokio::try_join!(
        client.search_exact_repo_name(&query),
        client.get_rate_limit(),
    )?;

    let search_quota = rate_limit.resources.search;

    {
        let mut limiter = limiter
            .lock()
            .map_err(|_| AppError::Internal("rate limiter lock poisoned".to_string()))?;
        limiter.record_attempt(SEARCH_ENDPOINT, search_quota.remaining);
    }

    let total_count = results.len();
    Ok(HttpResponse::Ok().json(SearchResponseBody {
        query,
        results,
        total_count,
        rate_limit: RateLimitSummary {
            remaining: search_quota.remaining,
            limit: search_quota.limit,
            reset: search_quota.reset,
        },
    }))
}

/// Validates the candidate name: present, 1..=100 characters.
fn validate_query(q: Option<String>) -> AppResult<String> {
    let query = q.unwrap_or_default();
    if query.is_empty() || query.chars().count() > MAX_QUERY_CHARS {
        return Err(AppError::Validation("Invalid query parameter".to_string()));
    }
    Ok(query)
}

/// Configure search routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/search", web::get().to(search));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some(String::new()))]
    fn empty_query_is_rejected(#[case] q: Option<String>) {
        assert!(matches!(validate_query(q), Err(AppError::Validation(_))));
    }

    #[test]
    fn oversized_query_is_rejected() {
        let q = "a".repeat(MAX_QUERY_CHARS + 1);
        assert!(matches!(
            validate_query(Some(q)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn boundary_lengths_are_accepted() {
        assert_eq!(validate_query(Some("a".to_string())).unwrap(), "a");
        let max = "a".repeat(MAX_QUERY_CHARS);
        assert_eq!(validate_query(Some(max.clone())).unwrap(), max);
    }

    #[test]
    fn multibyte_queries_count_characters_not_bytes() {
        // 100 CJK characters exceed 100 bytes but are within the char limit
        let q = "名".repeat(MAX_QUERY_CHARS);
        assert!(validate_query(Some(q)).is_ok());
    }
}
