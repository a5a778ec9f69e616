use thiserror::Error;

/// Errors from repository operations (used by trait definitions in
/// chatledger-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Transport-level failure reaching the storage engine. Retryable by
    /// the caller; the repository performs no internal retry.
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors surfaced by the chat history service.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The caller asked for a negative history window. Caller bug, never
    /// retried; reported before any storage access.
    #[error("limit must be non-negative, got {0}")]
    InvalidLimit(i64),

    /// An append targeted a session that does not exist.
    #[error("chat session not found")]
    SessionNotFound,

    /// Storage-layer failure, propagated unmodified.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl HistoryError {
    /// Whether the caller may retry the operation as-is.
    ///
    /// Only transport-level storage failures qualify. Note that retrying a
    /// timed-out append duplicates the message unless it carries an
    /// idempotency key.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HistoryError::Repository(RepositoryError::Connection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_history_error_display() {
        let err = HistoryError::InvalidLimit(-3);
        assert_eq!(err.to_string(), "limit must be non-negative, got -3");
    }

    #[test]
    fn test_repository_error_passes_through() {
        let err = HistoryError::from(RepositoryError::NotFound);
        assert_eq!(err.to_string(), "entity not found");
    }

    #[test]
    fn test_only_connection_errors_are_retryable() {
        assert!(HistoryError::from(RepositoryError::Connection).is_retryable());
        assert!(!HistoryError::SessionNotFound.is_retryable());
        assert!(!HistoryError::InvalidLimit(-1).is_retryable());
        assert!(!HistoryError::from(RepositoryError::Conflict("dup".into())).is_retryable());
    }
}
