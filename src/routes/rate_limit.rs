use actix_web::{web, HttpResponse};
use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::github::GithubClient;
use crate::services::QuotaReport;

/// GET /rate-limit
///
/// Polls GitHub's live quota and answers with a display-ready snapshot for
/// the search and core namespaces. Does not consume local budget: this is the
/// UI's polling surface.
pub async fn get_rate_limit(github: web::Data<Option<GithubClient>>) -> AppResult<HttpResponse> {
    let client = github
        .as_ref()
        .as_ref()
        .ok_or_else(|| AppError::Configuration("GitHub token not configured".to_string()))?;

    let response = client.get_rate_limit().await?;
    let report = QuotaReport::from_response(&response, Utc::now());

    Ok(HttpResponse::Ok().json(report))
}

/// Configure rate limit routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/rate-limit", web::get().to(get_rate_limit));
}
