use std::sync::Arc;

use chrono::{DateTime, Utc};
use models::story::Story;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::storage::json_doc_store::JsonDocStore;

/// The persisted feed document, newest story first.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Feed {
    pub stories: Vec<Story>,
}

/// File-backed news feed.
#[derive(Clone)]
pub struct NewsStore {
    store: Arc<JsonDocStore<Feed>>,
}

impl NewsStore {
    pub async fn new<P: Into<std::path::PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonDocStore::<Feed>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }

    /// All stories, newest first.
    pub async fn list(&self) -> Vec<Story> {
        self.store.read(|f| f.stories.clone()).await
    }

    /// Publish a story at the head of the feed.
    pub async fn publish(
        &self,
        title: &str,
        content: &str,
        author: &str,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<Story, ServiceError> {
        let story = Story::new(title, content, author, timestamp)?;
        let stored = story.clone();
        self.store
            .update(move |feed| {
                feed.stories.insert(0, stored);
                Ok(())
            })
            .await?;
        Ok(story)
    }
}
