use std::result::Result as StdResult;

use spendify_config::ConfigError;
use spendify_core::CoreError;
use spendify_domain::DateWindowError;
use thiserror::Error;

/// Unified error type for the service, storage and config layers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("You are not signed in. Use `login` or `signup` first.")]
    NotSignedIn,
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = StdResult<T, AppError>;

impl AppError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AppError::Unavailable(_))
    }
}

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] AppError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

impl From<DateWindowError> for AppError {
    fn from(err: DateWindowError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotAuthenticated => AppError::NotSignedIn,
            CoreError::AuthFailed(message) => AppError::Auth(message),
            CoreError::UserNotFound(id) => AppError::NotFound(format!("user {id}")),
            CoreError::CategoryNotFound(name) => AppError::NotFound(format!("category {name}")),
            CoreError::ExpenseNotFound(id) => AppError::NotFound(format!("expense {id}")),
            CoreError::DebtNotFound(id) => AppError::NotFound(format!("record {id}")),
            CoreError::InvalidOperation(message) | CoreError::Validation(message) => {
                AppError::InvalidInput(message)
            }
            CoreError::DateRange(err) => AppError::from(err),
            CoreError::Unavailable(message) => AppError::Unavailable(message),
            CoreError::Storage(message) => AppError::StorageError(message),
            CoreError::Serde(err) => AppError::StorageError(err.to_string()),
            CoreError::Io(err) => AppError::StorageError(err.to_string()),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => AppError::StorageError(io.to_string()),
            ConfigError::Serde(message) => AppError::ConfigError(message),
            invalid @ (ConfigError::InvalidValue { .. } | ConfigError::UnknownKey(_)) => {
                AppError::InvalidInput(invalid.to_string())
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::from(AppError::from(err))
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::from(AppError::from(err))
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Core(AppError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn core_errors_map_to_user_facing_variants() {
        assert!(matches!(
            AppError::from(CoreError::NotAuthenticated),
            AppError::NotSignedIn
        ));
        assert!(AppError::from(CoreError::Unavailable("down".into())).is_unavailable());
        let missing = AppError::from(CoreError::ExpenseNotFound(Uuid::nil()));
        assert!(missing.to_string().starts_with("Not found: expense"));
    }

    #[test]
    fn config_validation_becomes_invalid_input() {
        let err = AppError::from(ConfigError::UnknownKey("theme".into()));
        assert_eq!(err.to_string(), "Invalid input: Unknown setting `theme`");
    }
}
