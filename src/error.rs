//! Error types shared across the crate

use thiserror::Error;

/// Errors raised by the triple store, its persistence layer and the chat loop
#[derive(Error, Debug)]
pub enum RdfError {
    /// Reading or writing a backing file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RDF text could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// The graph could not be written in the requested syntax
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// A JSON document (graph upload, triple payload) was malformed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A request carried values the store refuses to accept
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The external completion endpoint failed or answered nonsense
    #[error("Completion endpoint error: {0}")]
    Completion(String),

    /// A blocking store task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl RdfError {
    /// Whether the error was caused by the caller's input (4xx) rather than
    /// by the server or one of its collaborators (5xx)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RdfError::Parse(_) | RdfError::Json(_) | RdfError::InvalidInput(_)
        )
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        RdfError::InvalidInput(message.into())
    }
}

impl From<rio_turtle::TurtleError> for RdfError {
    fn from(err: rio_turtle::TurtleError) -> Self {
        RdfError::Parse(err.to_string())
    }
}

/// Result type for store operations
pub type RdfResult<T> = Result<T, RdfError>;
