//! Human-readable run report written to standard output.

use crate::queue::EmailAction;

pub const HEADER: &str = "=== Sending Test Messages with Correct Format ===\n";

pub const SENT: &str = "✓ Sent successfully\n";

/// Lines printed before an event is published.
pub fn progress(index: usize, action: EmailAction, pretty_body: &str) -> String {
    format!("Test {index}: {action}\nMessage: {pretty_body}")
}

pub fn summary(count: usize) -> String {
    format!("✓ All {count} test messages sent!")
}

/// Where to look for the consumer's reaction, printed after the summary.
pub const LOG_HINT: &str = "\nCheck James logs with:\n\
docker-compose logs -f james | grep -E '(★|Processing|mailbox|Moving)'";

/// Failure line with the error chain.
///
/// lapin's IO errors already render their inner `io::Error`, so a cause whose
/// text is already on the line is skipped.
pub fn failure(err: &anyhow::Error) -> String {
    let mut line = format!("✗ Failed to send test messages: {err}");
    for cause in err.chain().skip(1) {
        let text = cause.to_string();
        if !line.contains(&text) {
            line.push_str(": ");
            line.push_str(&text);
        }
    }
    line
}
