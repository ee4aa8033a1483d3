use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error on `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}

impl ModelError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation { field, reason: reason.into() }
    }
}
