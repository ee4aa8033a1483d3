use thiserror::Error;
use tracing::error;

use models::errors::ModelError;

/// Domain failures shared by every resource service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{resource} not found: id {id}")]
    NotFound { resource: &'static str, id: i32 },
    #[error("{resource} {id} is still referenced by other records")]
    IntegrityConflict { resource: &'static str, id: i32 },
    #[error("validation error on `{field}`: {reason}")]
    Validation { field: String, reason: String },
    /// Store failure outside the taxonomy above; details are logged, not returned.
    #[error("storage failure")]
    Storage,
}

impl ServiceError {
    pub fn not_found(resource: &'static str, id: i32) -> Self { Self::NotFound { resource, id } }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), reason: reason.into() }
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::NotFound { .. } => 2001,
            ServiceError::IntegrityConflict { .. } => 2002,
            ServiceError::Validation { .. } => 2003,
            ServiceError::Storage => 2100,
        }
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::NotFound { .. } => "not_found",
            ServiceError::IntegrityConflict { .. } => "integrity_conflict",
            ServiceError::Validation { .. } => "validation",
            ServiceError::Storage => "storage",
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Validation { field, reason } => ServiceError::Validation { field: field.to_string(), reason },
            ModelError::Db(e) => {
                error!(error = %e, "model layer storage failure");
                ServiceError::Storage
            }
        }
    }
}
