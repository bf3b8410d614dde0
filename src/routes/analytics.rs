use std::sync::Mutex;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::services::VisitStats;

/// Client metadata sent alongside a visit. All fields optional; the body is
/// best-effort parsed and never rejects the request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitPayload {
    pub timestamp: Option<i64>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

#[derive(Serialize)]
pub struct VisitRecorded {
    pub success: bool,
    pub recorded: bool,
}

/// POST /analytics/visit
///
/// Counts one visit. Always answers 200 with `recorded: true`; visit counting
/// is non-critical telemetry, so a malformed body still counts.
pub async fn record_visit(
    stats: web::Data<Mutex<VisitStats>>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    match serde_json::from_slice::<VisitPayload>(&body) {
        Ok(payload) => {
            log::debug!(
                "Visit recorded: user_agent={:?} referrer={:?}",
                payload.user_agent,
                payload.referrer
            );
        }
        Err(e) => {
            log::debug!("Unparsable visit payload, counting anyway: {}", e);
        }
    }

    let mut stats = stats
        .lock()
        .map_err(|_| AppError::Internal("visit stats lock poisoned".to_string()))?;
    stats.record_visit();

    Ok(HttpResponse::Ok().json(VisitRecorded {
        success: true,
        recorded: true,
    }))
}

/// GET /analytics/visit
///
/// Current process-wide counters: lifetime total, today's count, and the
/// pruned per-day map.
pub async fn get_visits(stats: web::Data<Mutex<VisitStats>>) -> AppResult<HttpResponse> {
    let stats = stats
        .lock()
        .map_err(|_| AppError::Internal("visit stats lock poisoned".to_string()))?;

    Ok(HttpResponse::Ok().json(stats.snapshot()))
}

/// Configure analytics routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/analytics")
            .route("/visit", web::post().to(record_visit))
            .route("/visit", web::get().to(get_visits)),
    );
}
