use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::QueryRejection;
use chrono::Utc;
use thiserror::Error;

use service::errors::ServiceError;

/// JSON error body: `{timestamp, status, error, message, path}`.
#[derive(Debug)]
pub struct JsonApiError {
    status: StatusCode,
    error: &'static str,
    message: Option<String>,
    path: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: Option<String>) -> Self {
        Self { status, error, message, path: None }
    }

    /// Attach the request path reported in the body.
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn status(&self) -> StatusCode { self.status }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let (status, error) = match &e {
            ServiceError::NotFound { .. } => (StatusCode::NOT_FOUND, "Resource not found"),
            ServiceError::IntegrityConflict { .. } => (StatusCode::BAD_REQUEST, "Database exception"),
            ServiceError::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "Validation exception"),
            ServiceError::Storage => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        };
        JsonApiError::new(status, error, Some(e.to_string()))
    }
}

/// Label for requests axum refused before a handler ran.
fn rejection_label(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNPROCESSABLE_ENTITY => "Validation exception",
        other => other.canonical_reason().unwrap_or("Bad Request"),
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(r: JsonRejection) -> Self {
        let status = r.status();
        JsonApiError::new(status, rejection_label(status), Some(r.body_text()))
    }
}

impl From<PathRejection> for JsonApiError {
    fn from(r: PathRejection) -> Self {
        let status = r.status();
        JsonApiError::new(status, rejection_label(status), Some(r.body_text()))
    }
}

impl From<QueryRejection> for JsonApiError {
    fn from(r: QueryRejection) -> Self {
        JsonApiError::new(StatusCode::BAD_REQUEST, "Bad Request", Some(format!("Failed to deserialize query string: {r}")))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "status": self.status.as_u16(),
            "error": self.error,
            "message": self.message,
            "path": self.path,
        });
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("database unavailable: {0}")]
    Database(String),
}
