//! Wire types for the `james.email.actions` queue.
//!
//! Each message is one JSON object describing a mailbox action:
//!
//! ```json
//! {"action":"TRASH","sourceMailboxID":"#private:testuser@localhost:INBOX",
//!  "sourceMessageID":"1","destinationMailboxID":null,"hashID":"test-trash-1700000000"}
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::PublishError;

/// Queue name the mailbox action consumer listens on.
pub const ACTION_QUEUE: &str = "james.email.actions";

// =============================================================================
// Action
// =============================================================================

/// Mailbox action understood by the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailAction {
    /// Move the message to the trash; no destination.
    Trash,
    /// Move the message to another mailbox.
    Move,
}

impl EmailAction {
    /// Wire tag, e.g. `"TRASH"`.
    pub fn as_str(self) -> &'static str {
        match self {
            EmailAction::Trash => "TRASH",
            EmailAction::Move => "MOVE",
        }
    }

    pub fn requires_destination(self) -> bool {
        matches!(self, EmailAction::Move)
    }
}

impl fmt::Display for EmailAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Mailbox identifier
// =============================================================================

/// Mailbox identifier of the form `#<namespace>:<user>@<host>:<folder>`.
///
/// Serialized as the plain string. Everything after the second `:` belongs to
/// the folder, so nested folders like `INBOX.Work` survive unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MailboxId {
    namespace: String,
    user: String,
    host: String,
    folder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailboxIdError {
    #[error("mailbox id {0:?} must start with '#'")]
    MissingPrefix(String),
    #[error("mailbox id {0:?} is not of the form #namespace:user@host:folder")]
    Malformed(String),
    #[error("mailbox id {0:?} has an empty {1}")]
    EmptyPart(String, &'static str),
}

impl MailboxId {
    pub fn new(
        namespace: impl Into<String>,
        user: impl Into<String>,
        host: impl Into<String>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            user: user.into(),
            host: host.into(),
            folder: folder.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }
}

impl fmt::Display for MailboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{}:{}@{}:{}",
            self.namespace, self.user, self.host, self.folder
        )
    }
}

impl FromStr for MailboxId {
    type Err = MailboxIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('#')
            .ok_or_else(|| MailboxIdError::MissingPrefix(s.to_string()))?;

        let malformed = || MailboxIdError::Malformed(s.to_string());
        let (namespace, rest) = rest.split_once(':').ok_or_else(malformed)?;
        let (owner, folder) = rest.split_once(':').ok_or_else(malformed)?;
        let (user, host) = owner.rsplit_once('@').ok_or_else(malformed)?;

        for (part, name) in [
            (namespace, "namespace"),
            (user, "user"),
            (host, "host"),
            (folder, "folder"),
        ] {
            if part.is_empty() {
                return Err(MailboxIdError::EmptyPart(s.to_string(), name));
            }
        }

        Ok(MailboxId::new(namespace, user, host, folder))
    }
}

impl TryFrom<String> for MailboxId {
    type Error = MailboxIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MailboxId> for String {
    fn from(id: MailboxId) -> Self {
        id.to_string()
    }
}

// =============================================================================
// Action event (one queue message)
// =============================================================================

/// One mailbox action message.
///
/// Field order and names match the consumer's JSON schema. The destination is
/// always emitted, as `null` for actions without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEvent {
    action: EmailAction,
    #[serde(rename = "sourceMailboxID")]
    source_mailbox_id: MailboxId,
    #[serde(rename = "sourceMessageID")]
    source_message_id: String,
    #[serde(rename = "destinationMailboxID", default)]
    destination_mailbox_id: Option<MailboxId>,
    #[serde(rename = "hashID")]
    hash_id: String,
}

impl ActionEvent {
    /// Build a validated event.
    pub fn new(
        action: EmailAction,
        source_mailbox_id: MailboxId,
        source_message_id: impl Into<String>,
        destination_mailbox_id: Option<MailboxId>,
        hash_id: impl Into<String>,
    ) -> Result<Self, PublishError> {
        let event = Self {
            action,
            source_mailbox_id,
            source_message_id: source_message_id.into(),
            destination_mailbox_id,
            hash_id: hash_id.into(),
        };
        event.validate()?;
        Ok(event)
    }

    /// Check the invariants the consumer relies on.
    ///
    /// Deserialized events are not validated automatically.
    pub fn validate(&self) -> Result<(), PublishError> {
        let invalid = |reason: &str| {
            Err(PublishError::InvalidEvent {
                hash_id: self.hash_id.clone(),
                reason: reason.to_string(),
            })
        };

        if self.hash_id.trim().is_empty() {
            return invalid("hashID must not be empty");
        }
        if self.source_message_id.trim().is_empty() {
            return invalid("sourceMessageID must not be empty");
        }
        match (self.action, &self.destination_mailbox_id) {
            (EmailAction::Move, None) => invalid("MOVE requires a destination mailbox"),
            (EmailAction::Trash, Some(_)) => invalid("TRASH must not carry a destination mailbox"),
            _ => Ok(()),
        }
    }

    pub fn action(&self) -> EmailAction {
        self.action
    }

    pub fn source_mailbox_id(&self) -> &MailboxId {
        &self.source_mailbox_id
    }

    pub fn source_message_id(&self) -> &str {
        &self.source_message_id
    }

    pub fn destination_mailbox_id(&self) -> Option<&MailboxId> {
        self.destination_mailbox_id.as_ref()
    }

    pub fn hash_id(&self) -> &str {
        &self.hash_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbox() -> MailboxId {
        MailboxId::new("private", "testuser", "localhost", "INBOX")
    }

    fn archive() -> MailboxId {
        MailboxId::new("private", "testuser", "localhost", "Archive")
    }

    #[test]
    fn test_action_wire_tags() {
        assert_eq!(serde_json::to_string(&EmailAction::Trash).unwrap(), "\"TRASH\"");
        assert_eq!(serde_json::to_string(&EmailAction::Move).unwrap(), "\"MOVE\"");
        assert!(EmailAction::Move.requires_destination());
        assert!(!EmailAction::Trash.requires_destination());
    }

    #[test]
    fn test_mailbox_id_parse() {
        let id: MailboxId = "#private:testuser@localhost:INBOX".parse().unwrap();

        assert_eq!(id.namespace(), "private");
        assert_eq!(id.user(), "testuser");
        assert_eq!(id.host(), "localhost");
        assert_eq!(id.folder(), "INBOX");
        assert_eq!(id.to_string(), "#private:testuser@localhost:INBOX");
    }

    #[test]
    fn test_mailbox_id_nested_folder() {
        let id: MailboxId = "#private:bob@example.com:INBOX:Work".parse().unwrap();
        assert_eq!(id.folder(), "INBOX:Work");
        assert_eq!(id.to_string(), "#private:bob@example.com:INBOX:Work");
    }

    #[test]
    fn test_mailbox_id_rejects_malformed() {
        assert!(matches!(
            "private:testuser@localhost:INBOX".parse::<MailboxId>(),
            Err(MailboxIdError::MissingPrefix(_))
        ));
        assert!(matches!(
            "#private:testuser:INBOX".parse::<MailboxId>(),
            Err(MailboxIdError::Malformed(_))
        ));
        assert!(matches!(
            "#private:testuser@localhost".parse::<MailboxId>(),
            Err(MailboxIdError::Malformed(_))
        ));
        assert_eq!(
            "#private:testuser@localhost:".parse::<MailboxId>(),
            Err(MailboxIdError::EmptyPart(
                "#private:testuser@localhost:".to_string(),
                "folder"
            ))
        );
    }

    #[test]
    fn test_trash_event_serialization() {
        let event = ActionEvent::new(
            EmailAction::Trash,
            inbox(),
            "1",
            None,
            "test-trash-1700000000",
        )
        .unwrap();

        let json = serde_json::to_string(&event).unwrap();

        assert_eq!(
            json,
            r##"{"action":"TRASH","sourceMailboxID":"#private:testuser@localhost:INBOX","sourceMessageID":"1","destinationMailboxID":null,"hashID":"test-trash-1700000000"}"##
        );
    }

    #[test]
    fn test_move_event_round_trip_keeps_destination() {
        let event = ActionEvent::new(
            EmailAction::Move,
            inbox(),
            "2",
            Some(archive()),
            "test-move-1700000000",
        )
        .unwrap();

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r##""destinationMailboxID":"#private:testuser@localhost:Archive""##));

        let parsed: ActionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
        assert_eq!(
            parsed.destination_mailbox_id().unwrap().to_string(),
            "#private:testuser@localhost:Archive"
        );
    }

    #[test]
    fn test_missing_destination_reads_as_null() {
        let absent: ActionEvent = serde_json::from_str(
            r##"{"action":"TRASH","sourceMailboxID":"#private:testuser@localhost:INBOX","sourceMessageID":"1","hashID":"h1"}"##,
        )
        .unwrap();
        let null: ActionEvent = serde_json::from_str(
            r##"{"action":"TRASH","sourceMailboxID":"#private:testuser@localhost:INBOX","sourceMessageID":"1","destinationMailboxID":null,"hashID":"h1"}"##,
        )
        .unwrap();

        assert_eq!(absent, null);
        assert!(absent.destination_mailbox_id().is_none());
    }

    #[test]
    fn test_invalid_mailbox_in_payload_is_rejected() {
        let result: Result<ActionEvent, _> = serde_json::from_str(
            r#"{"action":"TRASH","sourceMailboxID":"INBOX","sourceMessageID":"1","hashID":"h1"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_move_without_destination_is_invalid() {
        let err = ActionEvent::new(EmailAction::Move, inbox(), "2", None, "test-move-1").unwrap_err();
        assert!(matches!(err, PublishError::InvalidEvent { .. }));

        let parsed: ActionEvent = serde_json::from_str(
            r##"{"action":"MOVE","sourceMailboxID":"#private:testuser@localhost:INBOX","sourceMessageID":"2","destinationMailboxID":null,"hashID":"h2"}"##,
        )
        .unwrap();
        assert!(parsed.validate().is_err());
    }

    #[test]
    fn test_trash_with_destination_is_invalid() {
        let result = ActionEvent::new(EmailAction::Trash, inbox(), "1", Some(archive()), "test-trash-1");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_hash_id_is_invalid() {
        let result = ActionEvent::new(EmailAction::Trash, inbox(), "1", None, "  ");
        assert!(result.is_err());
    }
}
