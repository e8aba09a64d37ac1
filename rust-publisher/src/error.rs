//! Error types for a publishing run.

use thiserror::Error;

/// Everything that can end a run early.
///
/// Messages name the failing step; the underlying lapin or serde error is kept
/// as the source so `{:#}` rendering shows the library text as well.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Broker connection parameters do not form a valid AMQP URI.
    #[error("invalid broker address {target}: {reason}")]
    InvalidUri { target: String, reason: String },

    /// Broker unreachable or credentials rejected.
    #[error("failed to connect to RabbitMQ at {target}")]
    Connect {
        target: String,
        #[source]
        source: lapin::Error,
    },

    #[error("failed to create channel")]
    Channel(#[source] lapin::Error),

    /// Queue declaration refused, e.g. an existing non-durable queue of the same name.
    #[error("failed to declare queue {queue}")]
    QueueDeclare {
        queue: String,
        #[source]
        source: lapin::Error,
    },

    #[error("failed to serialize event {hash_id}")]
    Serialize {
        hash_id: String,
        #[source]
        source: serde_json::Error,
    },

    /// Transmission or broker confirmation failed for one event.
    #[error("failed to publish event {hash_id} to {queue}")]
    Publish {
        queue: String,
        hash_id: String,
        #[source]
        source: lapin::Error,
    },

    #[error("invalid event {hash_id:?}: {reason}")]
    InvalidEvent { hash_id: String, reason: String },

    #[error("unknown scenario {0:?}")]
    UnknownScenario(String),

    #[error("no scenarios selected")]
    NoScenarios,
}
