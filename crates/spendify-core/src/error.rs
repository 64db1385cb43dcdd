use spendify_domain::DateWindowError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Not signed in")]
    NotAuthenticated,
    #[error("Authentication failed: {0}")]
    AuthFailed(String),
    #[error("User not found: {0}")]
    UserNotFound(Uuid),
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    #[error("Expense not found: {0}")]
    ExpenseNotFound(Uuid),
    #[error("Record not found: {0}")]
    DebtNotFound(Uuid),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid date range: {0}")]
    DateRange(#[from] DateWindowError),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// True when the failure is transient and the request may be retried later.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CoreError::Unavailable(_))
    }
}
