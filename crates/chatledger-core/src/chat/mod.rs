//! Chat history persistence abstractions.
//!
//! This module defines the `ChatRepository` trait the infrastructure layer
//! implements, and the `ChatHistoryService` that is the sole mediator
//! between conversation state and callers.

pub mod repository;
pub mod service;
