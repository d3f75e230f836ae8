use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Browser context not found: {0}")]
    ContextNotFound(String),

    #[error("Row key not found: {0}")]
    KeyNotFound(String),

    #[error("Write failed for field '{field}': {reason}")]
    WriteFailed { field: String, reason: String },

    #[error("Commit failed: {0}")]
    CommitFailed(String),

    #[error("Run cancelled")]
    Cancelled,

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Driver error: {0}")]
    DriverError(String),
}
