//! Named test scenarios for the mailbox action consumer.
//!
//! Every scenario has a stable id that can be selected through
//! `ACTION_SCENARIOS`. Without a selection, the enabled scenarios are sent in
//! table order.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use crate::error::PublishError;
use crate::queue::{ActionEvent, EmailAction, MailboxId};

const TEST_NAMESPACE: &str = "private";
const TEST_USER: &str = "testuser";
const TEST_HOST: &str = "localhost";

/// One row of the fixture table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    /// Stable identifier, e.g. `trash-inbox`
    pub id: &'static str,
    pub action: EmailAction,
    /// Message id inside the source mailbox
    pub message_id: &'static str,
    pub source_folder: &'static str,
    pub destination_folder: Option<&'static str>,
    /// Prefix of the hashID; the Unix timestamp is appended
    pub hash_label: &'static str,
    /// Sent when no explicit selection is given
    pub enabled: bool,
}

/// All known scenarios.
///
/// `move-work` stays disabled until the consumer side confirms it handles a
/// second MOVE target.
pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        id: "trash-inbox",
        action: EmailAction::Trash,
        message_id: "1",
        source_folder: "INBOX",
        destination_folder: None,
        hash_label: "test-trash",
        enabled: true,
    },
    Scenario {
        id: "move-archive",
        action: EmailAction::Move,
        message_id: "2",
        source_folder: "INBOX",
        destination_folder: Some("Archive"),
        hash_label: "test-move",
        enabled: true,
    },
    Scenario {
        id: "move-work",
        action: EmailAction::Move,
        message_id: "3",
        source_folder: "INBOX",
        destination_folder: Some("Work"),
        hash_label: "test-move-work",
        enabled: false,
    },
];

impl Scenario {
    /// Build the event for this scenario, stamping the hashID with `timestamp`.
    pub fn build(&self, timestamp: u64) -> Result<ActionEvent, PublishError> {
        ActionEvent::new(
            self.action,
            test_mailbox(self.source_folder),
            self.message_id,
            self.destination_folder.map(test_mailbox),
            format!("{}-{}", self.hash_label, timestamp),
        )
    }
}

fn test_mailbox(folder: &str) -> MailboxId {
    MailboxId::new(TEST_NAMESPACE, TEST_USER, TEST_HOST, folder)
}

/// Look up a scenario by id.
pub fn find(id: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.id == id)
}

/// Resolve the scenarios to send.
///
/// `None` selects the enabled rows in table order. An explicit list keeps its
/// own order; repeated ids are sent once.
pub fn select(ids: Option<&[String]>) -> Result<Vec<&'static Scenario>, PublishError> {
    let selected: Vec<&'static Scenario> = match ids {
        None => SCENARIOS.iter().filter(|s| s.enabled).collect(),
        Some(ids) => {
            let mut selected: Vec<&'static Scenario> = Vec::with_capacity(ids.len());
            for id in ids {
                let scenario = find(id).ok_or_else(|| PublishError::UnknownScenario(id.clone()))?;
                if selected.iter().any(|s| s.id == scenario.id) {
                    warn!(scenario = %id, "scenario_selected_twice");
                    continue;
                }
                selected.push(scenario);
            }
            selected
        }
    };

    if selected.is_empty() {
        return Err(PublishError::NoScenarios);
    }

    Ok(selected)
}

/// Build the events for a run, all stamped with the same `timestamp`.
pub fn build_events(ids: Option<&[String]>, timestamp: u64) -> Result<Vec<ActionEvent>, PublishError> {
    let events = select(ids)?
        .into_iter()
        .map(|scenario| scenario.build(timestamp))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        count = events.len(),
        timestamp = timestamp,
        "fixtures_built"
    );

    Ok(events)
}

/// Current Unix time in whole seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
