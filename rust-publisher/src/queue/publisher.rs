//! Publishing backends for action events.
//!
//! [`ActionSink`] is the seam the run loop talks to. [`Publisher`] is the real
//! RabbitMQ backend; [`DryRunSink`] only logs what would have been sent.

use lapin::{
    options::{BasicPublishOptions, QueueDeclareOptions},
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties,
};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::PublishError;

/// AMQP delivery mode asking the broker to persist the message.
pub const PERSISTENT: u8 = 2;

/// Properties for one action message: persistent JSON, tagged with its hashID.
pub fn message_properties(hash_id: &str) -> BasicProperties {
    BasicProperties::default()
        .with_delivery_mode(PERSISTENT)
        .with_content_type("application/json".into())
        .with_message_id(hash_id.to_string().into())
}

/// Destination for serialized action events.
#[allow(async_fn_in_trait)]
pub trait ActionSink {
    /// Make sure the durable queue exists. Idempotent.
    async fn declare_queue(&mut self, queue: &str) -> Result<(), PublishError>;

    /// Publish one JSON body to `queue` as a persistent message.
    async fn publish(&mut self, queue: &str, hash_id: &str, body: &[u8]) -> Result<(), PublishError>;

    /// Release the underlying resources. Never fails; problems are logged.
    async fn close(self);
}

/// RabbitMQ publisher owning one connection and one channel for the whole run.
pub struct Publisher {
    connection: Connection,
    channel: Channel,
}

impl Publisher {
    /// Connect to the broker described by `config` and open a channel.
    pub async fn connect(config: &Config) -> Result<Self, PublishError> {
        let uri = config.amqp_uri()?;
        let target = config.target();

        info!(target_addr = %target, "rabbitmq_publisher_connecting");

        let connection = Connection::connect(&uri, ConnectionProperties::default())
            .await
            .map_err(|source| PublishError::Connect {
                target: target.clone(),
                source,
            })?;

        info!(target_addr = %target, "rabbitmq_publisher_connected");

        let channel = match connection.create_channel().await {
            Ok(ch) => ch,
            Err(e) => {
                if let Err(close_err) = connection.close(200, "Channel setup failed").await {
                    warn!(error = %close_err, "rabbitmq_connection_close_error");
                }
                return Err(PublishError::Channel(e));
            }
        };

        info!("rabbitmq_channel_created");

        Ok(Self {
            connection,
            channel,
        })
    }
}

impl ActionSink for Publisher {
    async fn declare_queue(&mut self, queue: &str) -> Result<(), PublishError> {
        self.channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|source| PublishError::QueueDeclare {
                queue: queue.to_string(),
                source,
            })?;

        info!(queue = %queue, durable = true, "rabbitmq_queue_declared");

        Ok(())
    }

    async fn publish(&mut self, queue: &str, hash_id: &str, body: &[u8]) -> Result<(), PublishError> {
        let publish_error = |source: lapin::Error| PublishError::Publish {
            queue: queue.to_string(),
            hash_id: hash_id.to_string(),
            source,
        };

        self.channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                body,
                message_properties(hash_id),
            )
            .await
            .map_err(publish_error)?
            .await
            .map_err(publish_error)?;

        info!(
            queue = %queue,
            hash_id = %hash_id,
            body_length = body.len(),
            "rabbitmq_action_published"
        );

        Ok(())
    }

    async fn close(self) {
        if let Err(e) = self.channel.close(200, "Normal shutdown").await {
            warn!(error = %e, "rabbitmq_channel_close_error");
        }

        if let Err(e) = self.connection.close(200, "Normal shutdown").await {
            warn!(error = %e, "rabbitmq_connection_close_error");
        }

        info!("rabbitmq_publisher_closed");
    }
}

/// Sink that logs events instead of sending them.
#[derive(Debug, Default)]
pub struct DryRunSink {
    published: usize,
}

impl ActionSink for DryRunSink {
    async fn declare_queue(&mut self, queue: &str) -> Result<(), PublishError> {
        info!(queue = %queue, "dry_run_queue_declare_skipped");
        Ok(())
    }

    async fn publish(&mut self, queue: &str, hash_id: &str, body: &[u8]) -> Result<(), PublishError> {
        self.published += 1;
        info!(
            queue = %queue,
            hash_id = %hash_id,
            body = %String::from_utf8_lossy(body),
            "dry_run_publish"
        );
        Ok(())
    }

    async fn close(self) {
        info!(published = self.published, "dry_run_closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_counts_publishes() {
        let mut sink = DryRunSink::default();

        sink.declare_queue("james.email.actions").await.unwrap();
        sink.publish("james.email.actions", "h1", b"{}").await.unwrap();
        sink.publish("james.email.actions", "h2", b"{}").await.unwrap();

        assert_eq!(sink.published, 2);
        sink.close().await;
    }

    #[test]
    fn test_message_properties_are_persistent_json() {
        let props = message_properties("test-move-1700000000");

        assert_eq!(props.delivery_mode(), &Some(2));
        assert_eq!(
            props.content_type().as_ref().map(|c| c.as_str()),
            Some("application/json")
        );
        assert_eq!(
            props.message_id().as_ref().map(|m| m.as_str()),
            Some("test-move-1700000000")
        );
    }

    #[tokio::test]
    async fn test_connect_refused_is_connect_error() {
        // Port 1 is reserved and nothing listens on it in test environments.
        let config = Config {
            port: 1,
            ..Config::default()
        };

        match Publisher::connect(&config).await {
            Err(PublishError::Connect { target, .. }) => {
                assert!(target.starts_with("localhost:1 "));
            }
            Err(other) => panic!("expected connect error, got {other}"),
            Ok(_) => panic!("expected connect error"),
        }
    }
}
