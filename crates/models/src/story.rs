use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

/// A comment attached to a news story.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// A story on the campus news feed. New stories start with zero engagement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Story {
    pub fn new(
        title: &str,
        content: &str,
        author: &str,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<Self, ModelError> {
        if title.trim().is_empty() || content.trim().is_empty() || author.trim().is_empty() {
            return Err(ModelError::Validation("title, content and author required".into()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            author: author.to_string(),
            timestamp: timestamp.unwrap_or_else(Utc::now),
            likes: 0,
            comments: Vec::new(),
        })
    }
}
