//! SQLite chat repository implementation.
//!
//! Implements `ChatRepository` from `chatledger-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reads on the reader
//! pool and writes on the writer pool. Each call acquires a scoped
//! connection from its pool and releases it on every exit path.

use chatledger_core::chat::repository::ChatRepository;
use chatledger_types::chat::{ChatMessage, ChatSession, MessageRole};
use chatledger_types::error::RepositoryError;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ChatRepository`.
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatSessionRow {
    id: String,
    external_chat_id: String,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            external_chat_id: row.try_get("external_chat_id")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        let id = parse_uuid(&self.id)?;
        Ok(ChatSession {
            id,
            external_chat_id: self.external_chat_id,
        })
    }
}

struct ChatMessageRow {
    id: String,
    session_id: String,
    role: String,
    content: String,
    timestamp: String,
    idempotency_key: Option<String>,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            timestamp: row.try_get("timestamp")?,
            idempotency_key: row.try_get("idempotency_key")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = parse_uuid(&self.id)?;
        let session_id = parse_uuid(&self.session_id)?;
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let timestamp = parse_datetime(&self.timestamp)?;

        Ok(ChatMessage {
            id,
            session_id,
            role,
            content: self.content,
            timestamp,
            idempotency_key: self.idempotency_key,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_uuid(s: &str) -> Result<Uuid, RepositoryError> {
    s.parse::<Uuid>()
        .map_err(|e| RepositoryError::Query(format!("invalid UUID: {e}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Classify a sqlx error into the repository taxonomy: uniqueness
/// violations become `Conflict`, foreign-key violations `NotFound`,
/// transport failures `Connection`, everything else `Query`.
fn map_sqlx_err(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::Database(db_err) => {
            let msg = db_err.message().to_string();
            if msg.contains("UNIQUE") {
                RepositoryError::Conflict(msg)
            } else if msg.contains("FOREIGN KEY") {
                RepositoryError::NotFound
            } else {
                RepositoryError::Query(msg)
            }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// ChatRepository implementation
// ---------------------------------------------------------------------------

impl ChatRepository for SqliteChatRepository {
    async fn find_session_by_external_id(
        &self,
        external_chat_id: &str,
    ) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE external_chat_id = ?")
            .bind(external_chat_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        match row {
            Some(row) => {
                let session_row = ChatSessionRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn insert_session(&self, session: &ChatSession) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO chat_sessions (id, external_chat_id) VALUES (?, ?)")
            .bind(session.id.to_string())
            .bind(&session.external_chat_id)
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_err)?;

        Ok(())
    }

    async fn insert_message(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_messages (id, session_id, role, content, timestamp, idempotency_key)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(message.id.to_string())
        .bind(message.session_id.to_string())
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(format_datetime(&message.timestamp))
        .bind(&message.idempotency_key)
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_err)?;

        Ok(())
    }

    async fn recent_messages(
        &self,
        session_id: &Uuid,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT * FROM chat_messages
               WHERE session_id = ?
               ORDER BY timestamp DESC
               LIMIT ?"#,
        )
        .bind(session_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(map_sqlx_err)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row =
                ChatMessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(msg_row.into_message()?);
        }

        // Newest-first from the query; flip to chronological order.
        messages.reverse();
        Ok(messages)
    }

    async fn find_message_by_idempotency_key(
        &self,
        session_id: &Uuid,
        idempotency_key: &str,
    ) -> Result<Option<ChatMessage>, RepositoryError> {
        let row = sqlx::query(
            "SELECT * FROM chat_messages WHERE session_id = ? AND idempotency_key = ?",
        )
        .bind(session_id.to_string())
        .bind(idempotency_key)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(map_sqlx_err)?;

        match row {
            Some(row) => {
                let msg_row = ChatMessageRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(msg_row.into_message()?))
            }
            None => Ok(None),
        }
    }

    async fn delete_messages(&self, session_id: &Uuid) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE session_id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_err)?;

        Ok(result.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
