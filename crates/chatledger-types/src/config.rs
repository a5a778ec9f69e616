//! Configuration types for Chatledger.
//!
//! `HistoryConfig` represents the settings the embedding process hands the
//! history service at construction time.

use serde::{Deserialize, Serialize};

/// Process-wide settings for the chat history service.
///
/// All fields have sensible defaults, so an empty config file is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Default number of messages a history window holds when the caller
    /// does not override the limit. Growth of the message table is
    /// compensated for entirely at read time by this bound.
    #[serde(default = "default_max_history_messages")]
    pub max_history_messages: i64,
}

fn default_max_history_messages() -> i64 {
    50
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_messages: default_max_history_messages(),
        }
    }
}
