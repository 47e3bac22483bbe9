use std::sync::Arc;

use chrono::{DateTime, Utc};
use models::message::{conversation_key, Message};

use crate::errors::ServiceError;
use crate::storage::json_map_store::JsonMapStore;

/// File-backed direct-message store. One entry per conversation, keyed by
/// the sorted email pair, holding the messages in send order.
#[derive(Clone)]
pub struct MessageStore {
    store: Arc<JsonMapStore<String, Vec<Message>>>,
}

impl MessageStore {
    pub async fn new<P: Into<std::path::PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::<String, Vec<Message>>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }

    /// All messages between two users, oldest first. Empty when the two
    /// have never talked.
    pub async fn conversation(&self, user1: &str, user2: &str) -> Vec<Message> {
        self.store
            .get(&conversation_key(user1, user2))
            .await
            .unwrap_or_default()
    }

    /// Append a message to the conversation, creating it on first contact.
    /// The client may supply its own timestamp; otherwise the server stamps
    /// receipt time.
    pub async fn append(
        &self,
        sender: &str,
        recipient: &str,
        body: &str,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<Message, ServiceError> {
        let msg = Message::new(sender, recipient, body, timestamp)?;
        let key = conversation_key(sender, recipient);
        let stored = msg.clone();
        self.store
            .update_map(move |map| {
                map.entry(key).or_default().push(stored);
                Ok(())
            })
            .await?;
        Ok(msg)
    }
}
