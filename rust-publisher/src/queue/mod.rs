//! Queue module for RabbitMQ operations.
//!
//! This module provides:
//! - The JSON message types for the mailbox action queue
//! - The publishing backends (RabbitMQ and dry run)
//!
//! ## Message flow
//!
//! ```text
//! Fixtures → ActionEvent → JSON → james.email.actions → mailbox action consumer
//! ```

pub mod publisher;
pub mod types;

pub use publisher::{message_properties, ActionSink, DryRunSink, Publisher, PERSISTENT};
pub use types::{ActionEvent, EmailAction, MailboxId, MailboxIdError, ACTION_QUEUE};
