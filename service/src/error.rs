use crate::dto::ValidationErrors;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenericError {
    #[error("not found: {0}")]
    NotFound(&'static str),
    #[error("unknown error: {0}")]
    UnknownError(&'static str),
    #[error("invalid configuration value for {0}")]
    InvalidConfig(&'static str),
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("unreadable leaderboard snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

impl From<ValidationErrors> for GenericError {
    fn from(e: ValidationErrors) -> Self {
        Self::Validation(e)
    }
}

impl GenericError {
    /// Record-level failures that a batch logs and skips instead of aborting on.
    pub fn is_validation(&self) -> bool {
        matches!(self, GenericError::Validation(_))
    }
}
