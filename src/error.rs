use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

/// Application errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Configuration(String),

    #[error("Rate limit exceeded. Please try again later.")]
    QuotaExceeded,

    #[error("GitHub API error: {status} - {body}")]
    RemoteApi { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::RemoteApi { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Network(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Log the full error before translation; upstream bodies and transport
        // detail must never reach the client payload.
        log::error!("Request failed: {}", self);

        let error_type = match self {
            AppError::Validation(_) => "ValidationError",
            AppError::Configuration(_) => "ConfigurationError",
            AppError::QuotaExceeded => "QuotaExceededError",
            AppError::RemoteApi { .. } => "RemoteApiError",
            AppError::Network(_) => "NetworkError",
            AppError::Internal(_) => "InternalError",
        };

        let message = match self {
            AppError::Validation(_) | AppError::Configuration(_) | AppError::QuotaExceeded => {
                self.to_string()
            }
            AppError::RemoteApi { .. } | AppError::Network(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
        };

        let response = ErrorResponse {
            error: ErrorDetail {
                error_type: error_type.to_string(),
                message,
            },
        };

        HttpResponse::build(self.status_code()).json(response)
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_exceeded_maps_to_429() {
        assert_eq!(
            AppError::QuotaExceeded.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn remote_api_error_hides_upstream_body() {
        let err = AppError::RemoteApi {
            status: 502,
            body: "secret upstream detail".to_string(),
        };
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = actix_rt::System::new()
            .block_on(actix_web::body::to_bytes(resp.into_body()))
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["type"], "RemoteApiError");
        assert_eq!(json["error"]["message"], "Internal server error");
    }

    #[test]
    fn validation_error_surfaces_its_message() {
        let err = AppError::Validation("Invalid query parameter".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Validation error: Invalid query parameter");
    }

    #[test]
    fn configuration_error_message_is_verbatim() {
        let err = AppError::Configuration("GitHub token not configured".to_string());
        assert_eq!(err.to_string(), "GitHub token not configured");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
