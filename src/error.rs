use thiserror::Error;

/// Unified error type for roll-dev operations
#[derive(Error, Debug)]
pub enum RollError {
    /// Wrong upstream remote or dirty working tree
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The describe string could not be turned into a version
    #[error("Version for this build could not be determined: {0}")]
    Parse(String),

    /// The operator lacks permission to publish
    #[error("Publish access check failed: {0}")]
    Access(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    /// Push failed after the release was already published
    #[error("Push failed: {0}")]
    Push(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in roll-dev
pub type Result<T> = std::result::Result<T, RollError>;

impl RollError {
    /// Create a precondition error with context
    pub fn precondition(msg: impl Into<String>) -> Self {
        RollError::Precondition(msg.into())
    }

    /// Create a parse error with context
    pub fn parse(msg: impl Into<String>) -> Self {
        RollError::Parse(msg.into())
    }

    /// Create an access error with context
    pub fn access(msg: impl Into<String>) -> Self {
        RollError::Access(msg.into())
    }

    /// Create a publish error with context
    pub fn publish(msg: impl Into<String>) -> Self {
        RollError::Publish(msg.into())
    }

    /// Create a push error with context
    pub fn push(msg: impl Into<String>) -> Self {
        RollError::Push(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        RollError::Config(msg.into())
    }
}
