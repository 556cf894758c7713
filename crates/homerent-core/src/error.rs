use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Service-agnostic rejection, used where a request is turned away before any service
/// logic runs (e.g. extractors).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("authentication required")]
    Unauthorized,
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

/// JSON error body shared by every service: `{"kind": ..., "message": ...}`.
pub fn error_body(status: StatusCode, kind: &str, message: String) -> Response {
    let body = serde_json::json!({
        "kind": kind,
        "message": message,
    });
    (status, axum::Json(body)).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error_body(self.status(), self.kind(), self.to_string())
    }
}
