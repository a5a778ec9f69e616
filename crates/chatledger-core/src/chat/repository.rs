//! ChatRepository trait definition.
//!
//! Storage operations for chat sessions and messages. Uses native async fn
//! in traits (RPITIT, Rust 2024 edition).

use chatledger_types::chat::{ChatMessage, ChatSession};
use chatledger_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for chat session and message persistence.
///
/// Implementations live in chatledger-infra (e.g., `SqliteChatRepository`).
/// Every method is one storage round trip and one transaction;
/// implementations acquire a scoped connection per call and release it on
/// every exit path. Serialization of concurrent access to the same
/// session's rows is the storage layer's responsibility.
pub trait ChatRepository: Send + Sync {
    /// Look up a session by its external chat identifier.
    fn find_session_by_external_id(
        &self,
        external_chat_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// Insert a new session row.
    ///
    /// Fails with `RepositoryError::Conflict` when another session already
    /// holds the external chat identifier.
    fn insert_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Insert one message row, committed before the future resolves.
    ///
    /// Fails with `RepositoryError::NotFound` when the owning session does
    /// not exist, and with `RepositoryError::Conflict` when the message's
    /// idempotency key is already present for the session.
    fn insert_message(
        &self,
        message: &ChatMessage,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Fetch the `limit` most recent messages for a session by timestamp,
    /// returned in chronological (oldest-first) order.
    fn recent_messages(
        &self,
        session_id: &Uuid,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Look up a message by its session and idempotency key.
    fn find_message_by_idempotency_key(
        &self,
        session_id: &Uuid,
        idempotency_key: &str,
    ) -> impl std::future::Future<Output = Result<Option<ChatMessage>, RepositoryError>> + Send;

    /// Delete all messages owned by a session in one atomic statement,
    /// returning the deleted-row count.
    fn delete_messages(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
