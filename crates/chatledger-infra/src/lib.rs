//! Infrastructure layer for Chatledger.
//!
//! Contains the SQLite implementation of the repository trait defined in
//! `chatledger-core`: WAL-mode storage with split read/write connection
//! pools.

pub mod sqlite;
