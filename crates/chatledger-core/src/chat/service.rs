//! Chat history service mediating all access to conversation state.
//!
//! `ChatHistoryService` coordinates session resolution, bounded history
//! retrieval, message appends, and history clearing on top of a
//! `ChatRepository`. It never calls the messaging platform or the model
//! client; it is a pure persistence boundary.

use chatledger_types::chat::{ChatMessage, ChatSession, HistoryEntry, MessageRole};
use chatledger_types::config::HistoryConfig;
use chatledger_types::error::{HistoryError, RepositoryError};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chat::repository::ChatRepository;

/// Attempts before a session-creation race is given up on.
const CREATE_SESSION_ATTEMPTS: u32 = 3;

/// Sole mediator between conversation state and callers.
///
/// Generic over `ChatRepository` so callers inject the storage
/// implementation at construction -- no process-wide singletons. Retrieval
/// is bounded by `max_history_messages`, so reads stay flat no matter how
/// long a conversation has run; appends never trim.
pub struct ChatHistoryService<R: ChatRepository> {
    repo: R,
    max_history_messages: i64,
}

impl<R: ChatRepository> ChatHistoryService<R> {
    /// Create a service with the given repository and configuration.
    ///
    /// The default window size is read once here; per-call overrides take
    /// precedence at retrieval time.
    pub fn new(repo: R, config: &HistoryConfig) -> Self {
        Self {
            repo,
            max_history_messages: config.max_history_messages,
        }
    }

    /// Access the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Resolve the session for an external chat identifier, creating it on
    /// first contact.
    ///
    /// Repeated calls with the same external id return a session with the
    /// same internal identifier. Two callers racing to create the same
    /// session cannot both win: the schema's uniqueness constraint rejects
    /// the loser, which then re-fetches the winner's row instead of
    /// surfacing the conflict.
    pub async fn get_or_create_session(
        &self,
        external_chat_id: &str,
    ) -> Result<ChatSession, HistoryError> {
        for attempt in 0..CREATE_SESSION_ATTEMPTS {
            if let Some(session) = self
                .repo
                .find_session_by_external_id(external_chat_id)
                .await?
            {
                return Ok(session);
            }

            let session = ChatSession {
                id: Uuid::now_v7(),
                external_chat_id: external_chat_id.to_string(),
            };

            match self.repo.insert_session(&session).await {
                Ok(()) => {
                    info!(session_id = %session.id, external_chat_id, "created chat session");
                    return Ok(session);
                }
                Err(RepositoryError::Conflict(_)) => {
                    // Lost the creation race; the next iteration fetches
                    // the winner's row.
                    warn!(external_chat_id, attempt, "session creation raced, re-fetching");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(RepositoryError::Conflict(format!(
            "session creation for '{external_chat_id}' kept racing"
        ))
        .into())
    }

    /// Retrieve the most recent messages of a session as a history window,
    /// oldest first.
    ///
    /// `limit` overrides the configured default window size; `None` uses
    /// it. A limit of zero yields an empty window, not an error; a negative
    /// limit fails with [`HistoryError::InvalidLimit`] before any storage
    /// access. Ordering follows the caller-supplied message timestamps,
    /// never insertion order.
    pub async fn history(
        &self,
        session_id: &Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<HistoryEntry>, HistoryError> {
        let limit = limit.unwrap_or(self.max_history_messages);
        if limit < 0 {
            return Err(HistoryError::InvalidLimit(limit));
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let messages = self.repo.recent_messages(session_id, limit).await?;
        debug!(
            session_id = %session_id,
            returned = messages.len(),
            limit,
            "fetched history window"
        );

        Ok(messages
            .into_iter()
            .map(|m| HistoryEntry {
                role: m.role,
                content: m.content,
            })
            .collect())
    }

    /// Append one message to a session's history.
    ///
    /// The insert is committed before this returns, so a `history` call
    /// issued next observes the message. The session must already exist;
    /// appends targeting a missing one fail with
    /// [`HistoryError::SessionNotFound`]. When `idempotency_key` is given
    /// and a message with that key is already stored for the session, the
    /// stored message is returned instead of inserting a duplicate.
    ///
    /// Nothing is ever trimmed here: growth is compensated for entirely at
    /// read time by the history window.
    pub async fn append_message(
        &self,
        session_id: Uuid,
        content: String,
        timestamp: DateTime<Utc>,
        role: MessageRole,
        idempotency_key: Option<String>,
    ) -> Result<ChatMessage, HistoryError> {
        let message = ChatMessage {
            id: Uuid::now_v7(),
            session_id,
            role,
            content,
            timestamp,
            idempotency_key,
        };

        match self.repo.insert_message(&message).await {
            Ok(()) => Ok(message),
            Err(RepositoryError::NotFound) => Err(HistoryError::SessionNotFound),
            Err(RepositoryError::Conflict(reason)) => {
                let Some(key) = message.idempotency_key.as_deref() else {
                    return Err(RepositoryError::Conflict(reason).into());
                };
                // A retried delivery re-used the key; hand back the
                // original insert.
                debug!(
                    session_id = %session_id,
                    idempotency_key = key,
                    "append replayed, returning stored message"
                );
                self.repo
                    .find_message_by_idempotency_key(&session_id, key)
                    .await?
                    .ok_or(HistoryError::Repository(RepositoryError::Conflict(reason)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete all messages owned by a session, returning how many were
    /// removed.
    ///
    /// Zero is a valid result for an already-empty session. The deletion
    /// is one statement, so a partial clear is never observable. The
    /// session row itself persists; the next append starts a fresh
    /// history.
    pub async fn clear_history(&self, session_id: &Uuid) -> Result<u64, HistoryError> {
        let deleted = self.repo.delete_messages(session_id).await?;
        info!(session_id = %session_id, deleted, "cleared chat history");
        Ok(deleted)
    }
}
