//! Mailbox action fixture publisher.
//!
//! Publishes a fixed table of mailbox action test events (TRASH, MOVE) to the
//! durable `james.email.actions` queue so a downstream consumer can be checked
//! by hand.
//!
//! ## Flow
//!
//! ```text
//! Scenario table → ActionEvent → JSON → RabbitMQ (persistent) → 2s pause → next
//! ```

pub mod config;
pub mod error;
pub mod fixtures;
pub mod queue;
pub mod report;
pub mod runner;

// Re-export commonly used types
pub use config::Config;
pub use error::PublishError;
pub use fixtures::{Scenario, SCENARIOS};
pub use queue::{ActionEvent, ActionSink, EmailAction, MailboxId, Publisher, ACTION_QUEUE};
pub use runner::{publish_events, run};
