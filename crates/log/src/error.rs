//! Logger errors

/// Result type for logger operations
pub type LogResult<T> = Result<T, LogError>;

/// Error type for logger operations
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filter parsing error
    #[error("Invalid filter: {0}")]
    Filter(String),

    /// A global subscriber is already installed
    #[error("Logger already initialized: {0}")]
    AlreadyInitialized(String),
}
