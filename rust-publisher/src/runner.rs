//! The publishing run: fixtures → connect → declare → publish loop → close.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info};

use crate::config::Config;
use crate::error::PublishError;
use crate::fixtures::{build_events, unix_now};
use crate::queue::{ActionEvent, ActionSink, DryRunSink, Publisher};
use crate::report;

/// Publish the selected fixtures and return how many were sent.
///
/// Fixtures are built and validated before any connection is opened. Once
/// connected, the connection is closed on every exit path.
pub async fn run(config: &Config) -> Result<usize, PublishError> {
    let events = build_events(config.scenarios.as_deref(), unix_now())?;

    if config.dry_run {
        info!("dry_run_enabled");
        return publish_events(
            DryRunSink::default(),
            &config.queue_name,
            &events,
            config.inter_message_delay,
        )
        .await;
    }

    let publisher = Publisher::connect(config).await?;

    publish_events(
        publisher,
        &config.queue_name,
        &events,
        config.inter_message_delay,
    )
    .await
}

/// Declare `queue`, publish `events` in order with `delay` between them, then
/// close `sink` whether or not publishing succeeded.
pub async fn publish_events<S: ActionSink>(
    mut sink: S,
    queue: &str,
    events: &[ActionEvent],
    delay: Duration,
) -> Result<usize, PublishError> {
    let result = send_all(&mut sink, queue, events, delay).await;

    if let Err(e) = &result {
        error!(queue = %queue, error = %e, "publish_run_aborted");
    }

    sink.close().await;
    result
}

async fn send_all<S: ActionSink>(
    sink: &mut S,
    queue: &str,
    events: &[ActionEvent],
    delay: Duration,
) -> Result<usize, PublishError> {
    sink.declare_queue(queue).await?;

    println!("{}", report::HEADER);

    for (i, event) in events.iter().enumerate() {
        let serialize_error = |source: serde_json::Error| PublishError::Serialize {
            hash_id: event.hash_id().to_string(),
            source,
        };
        let body = serde_json::to_vec(event).map_err(serialize_error)?;
        let pretty = serde_json::to_string_pretty(event).map_err(serialize_error)?;

        println!("{}", report::progress(i + 1, event.action(), &pretty));

        sink.publish(queue, event.hash_id(), &body).await?;

        println!("{}", report::SENT);
        info!(
            index = i + 1,
            action = %event.action(),
            hash_id = %event.hash_id(),
            "fixture_sent"
        );

        if i + 1 < events.len() && !delay.is_zero() {
            sleep(delay).await;
        }
    }

    Ok(events.len())
}
