use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("User not found: {0}")]
    UserNotFound(Uuid),
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
    #[error("Recurring series not found: {0}")]
    SeriesNotFound(Uuid),
    #[error("Budget period not found: {0}")]
    PeriodNotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Stable machine-readable code surfaced to callers alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::Conflict(_) => "CONFLICT",
            CoreError::PermissionDenied(_) => "PERMISSION_DENIED",
            CoreError::UserNotFound(_)
            | CoreError::AccountNotFound(_)
            | CoreError::SeriesNotFound(_)
            | CoreError::PeriodNotFound(_) => "NOT_FOUND",
            CoreError::Storage(_) | CoreError::Serde(_) | CoreError::Io(_) => "INTERNAL_ERROR",
        }
    }
}
