//! Business logic and repository trait definitions for Chatledger.
//!
//! This crate defines the "port" (the `ChatRepository` trait) that the
//! infrastructure layer implements, and the `ChatHistoryService` callers
//! drive. It depends only on `chatledger-types` -- never on
//! `chatledger-infra` or any database/IO crate.

pub mod chat;
