use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::calendar::CalendarError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotConfigured(String),

    #[error("{0}")]
    Upstream(String),

    #[error("calendar error: {0}")]
    Calendar(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::NotFound(id) => AppError::NotFound(id),
            CalendarError::Unavailable(e) => AppError::Conflict(e.to_string()),
            other => AppError::Calendar(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream(_) | AppError::Calendar(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({ "success": false, "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scheduling::SchedulingError;

    #[test]
    fn test_calendar_not_found_maps_to_404() {
        let err: AppError = CalendarError::NotFound("evt-1".to_string()).into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let err: AppError = CalendarError::Remote("boom".to_string()).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);

        let err: AppError = CalendarError::Unavailable(SchedulingError::Conflict).into();
        assert_eq!(err.to_string(), "that time slot is already booked");
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_bad_request_message_is_plain() {
        assert_eq!(AppError::BadRequest("Text is required".to_string()).to_string(), "Text is required");
    }
}
