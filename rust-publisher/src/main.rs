//! Action publisher - sends mailbox action test fixtures to RabbitMQ.
//!
//! Progress and the final summary go to standard output; structured JSON logs
//! go to standard error.

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use actionpub::{report, runner, Config};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize structured JSON logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true).with_writer(std::io::stderr))
        .init();

    info!("publisher_starting");

    // Load configuration from environment
    let config = Config::from_env();
    info!(
        host = %config.host,
        port = config.port,
        virtual_host = %config.virtual_host,
        queue = %config.queue_name,
        delay_ms = config.inter_message_delay.as_millis() as u64,
        dry_run = config.dry_run,
        "config_loaded"
    );

    match runner::run(&config).await {
        Ok(count) => {
            info!(count = count, "publisher_finished");
            println!("{}", report::summary(count));
            println!("{}", report::LOG_HINT);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let err = anyhow::Error::from(e);
            let rendered = format!("{err:#}");
            error!(error = %rendered, "publisher_failed");
            println!("{}", report::failure(&err));
            ExitCode::FAILURE
        }
    }
}
