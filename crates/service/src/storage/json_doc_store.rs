use std::{path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};

use crate::errors::ServiceError;

/// JSON file-backed single-document store.
///
/// Companion to [`JsonMapStore`](super::json_map_store::JsonMapStore) for
/// state that is one value rather than a keyed map (a schedule board, a
/// feed). Missing or unreadable files fall back to `T::default()`.
#[derive(Clone)]
pub struct JsonDocStore<T> {
    inner: Arc<RwLock<T>>,
    file_path: PathBuf,
}

impl<T> JsonDocStore<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned + Default + Clone,
{
    /// Initialize the store from a path. Creates the file with the default
    /// document if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let doc: T = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => {
                let doc = T::default();
                let bytes = serde_json::to_vec(&doc)
                    .map_err(|e| ServiceError::Storage(e.to_string()))?;
                fs::write(&file_path, bytes)
                    .await
                    .map_err(|e| ServiceError::Storage(e.to_string()))?;
                doc
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(doc)), file_path }))
    }

    /// Read through a closure without cloning the whole document.
    pub async fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let doc = self.inner.read().await;
        f(&doc)
    }

    /// Apply a mutation and persist atomically; the closure's result is
    /// returned to the caller.
    pub async fn update<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut T) -> Result<R, ServiceError>,
    {
        let mut doc = self.inner.write().await;
        let out = f(&mut doc)?;
        let data = serde_json::to_vec_pretty(&*doc).map_err(|e| ServiceError::Storage(e.to_string()))?;
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(out)
    }
}
