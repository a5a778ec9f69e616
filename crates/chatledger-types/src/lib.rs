//! Shared domain types for Chatledger.
//!
//! This crate contains the domain types used across the workspace: chat
//! sessions, messages, the history window wire shape, configuration, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
