use std::result::Result as StdResult;

use hearth_config::ConfigError;
use hearth_core::CoreError;
use hearth_domain::DateRangeError;
use thiserror::Error;

/// Unified error type for the engine, configuration and storage layers.
#[derive(Error, Debug)]
pub enum HearthError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = StdResult<T, HearthError>;

impl HearthError {
    /// Machine-readable code; engine errors keep their own.
    pub fn code(&self) -> &'static str {
        match self {
            HearthError::Core(err) => err.code(),
            HearthError::Config(ConfigError::Invalid(_)) | HearthError::InvalidInput(_) => {
                "VALIDATION_ERROR"
            }
            HearthError::Config(ConfigError::BackupNotFound(_)) => "NOT_FOUND",
            HearthError::Config(_) | HearthError::Serde(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DateRangeError> for HearthError {
    fn from(err: DateRangeError) -> Self {
        HearthError::InvalidInput(err.to_string())
    }
}

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Hearth(#[from] HearthError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl CliError {
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Hearth(err) => err.code(),
            CliError::Input(_) => "VALIDATION_ERROR",
            CliError::Output(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::Hearth(err.into())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Hearth(err.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Hearth(err.into())
    }
}

impl From<DateRangeError> for CliError {
    fn from(err: DateRangeError) -> Self {
        CliError::Hearth(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn codes_pass_through_layers() {
        let conflict: CliError = CoreError::Conflict("open".into()).into();
        assert_eq!(conflict.code(), "CONFLICT");
        let missing: CliError = CoreError::UserNotFound(Uuid::nil()).into();
        assert_eq!(missing.code(), "NOT_FOUND");
        let invalid: CliError = ConfigError::Invalid("day".into()).into();
        assert_eq!(invalid.code(), "VALIDATION_ERROR");
        assert_eq!(CliError::Input("bad".into()).code(), "VALIDATION_ERROR");
    }
}
