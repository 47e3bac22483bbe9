use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::profile::canonical_email;

/// A direct message between two users.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender: String,
    pub recipient: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(
        sender: &str,
        recipient: &str,
        body: &str,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<Self, ModelError> {
        if sender.trim().is_empty() || recipient.trim().is_empty() {
            return Err(ModelError::Validation("sender and recipient required".into()));
        }
        if body.is_empty() {
            return Err(ModelError::Validation("message required".into()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            sender: canonical_email(sender),
            recipient: canonical_email(recipient),
            message: body.to_string(),
            timestamp: timestamp.unwrap_or_else(Utc::now),
        })
    }
}

/// Stable key for a two-party conversation: emails sorted, joined with `|`.
/// Both directions of a conversation land in the same bucket.
pub fn conversation_key(a: &str, b: &str) -> String {
    let (a, b) = (canonical_email(a), canonical_email(b));
    if a <= b {
        format!("{a}|{b}")
    } else {
        format!("{b}|{a}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_key_is_order_independent() {
        assert_eq!(conversation_key("b@x.c", "a@x.c"), conversation_key("a@x.c", "b@x.c"));
        assert_eq!(conversation_key("A@x.c", "b@x.c"), "a@x.c|b@x.c");
    }

    #[test]
    fn message_requires_all_fields() {
        assert!(Message::new("", "b@x.c", "hi", None).is_err());
        assert!(Message::new("a@x.c", "b@x.c", "", None).is_err());
        let m = Message::new("a@x.c", "b@x.c", "hi", None).expect("valid");
        assert_eq!(m.message, "hi");
    }
}
