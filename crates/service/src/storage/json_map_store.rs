use std::{collections::HashMap, hash::Hash, path::PathBuf, sync::Arc};
use tokio::{fs, sync::RwLock};

use crate::errors::ServiceError;

/// Generic JSON file-backed key-value map store.
///
/// Persists a `HashMap<K, V>` to a JSON file and provides simple CRUD
/// helpers. Intended for lightweight state where a database is overkill.
/// The file is rewritten while the write lock is held, so a mutation and
/// its persistence are one atomic step with respect to other callers.
#[derive(Clone)]
pub struct JsonMapStore<K, V> {
    inner: Arc<RwLock<HashMap<K, V>>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates the file with an empty map if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.ok();
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => {
                let empty: HashMap<K, V> = HashMap::new();
                let bytes = serde_json::to_vec(&empty)
                    .map_err(|e| ServiceError::Storage(e.to_string()))?;
                fs::write(&file_path, bytes)
                    .await
                    .map_err(|e| ServiceError::Storage(e.to_string()))?;
                empty
            }
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    async fn persist(&self, map: &HashMap<K, V>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(map).map_err(|e| ServiceError::Storage(e.to_string()))?;
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Check whether a key exists.
    pub async fn contains_key(&self, key: &K) -> bool {
        let map = self.inner.read().await;
        map.contains_key(key)
    }

    /// List all entries as `(key, value)` pairs.
    pub async fn list(&self) -> Vec<(K, V)> {
        let map = self.inner.read().await;
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Read through a closure without cloning the whole map.
    pub async fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&HashMap<K, V>) -> R,
    {
        let map = self.inner.read().await;
        f(&map)
    }

    /// Insert or update a value by key and persist.
    pub async fn insert(&self, key: K, value: V) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        map.insert(key, value);
        self.persist(&map).await
    }

    /// Remove a key and persist; returns whether it existed.
    pub async fn remove(&self, key: &K) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        let existed = map.remove(key).is_some();
        self.persist(&map).await?;
        Ok(existed)
    }

    /// Apply a mutation to the underlying map and persist atomically.
    /// The closure's result is returned to the caller, which lets multi-key
    /// updates (e.g. a balance transfer) observe and mutate under one lock.
    pub async fn update_map<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut HashMap<K, V>) -> Result<R, ServiceError>,
    {
        let mut map = self.inner.write().await;
        let out = f(&mut map)?;
        self.persist(&map).await?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{tag}_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn json_map_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = temp_path("json_map_store");
        let store = JsonMapStore::<String, String>::new(&tmp).await?;

        // initially empty
        assert_eq!(store.list().await.len(), 0);

        store.insert("a".into(), "1".into()).await?;
        store.insert("b".into(), "2".into()).await?;
        assert!(store.contains_key(&"a".into()).await);
        assert_eq!(store.get(&"a".into()).await.unwrap(), "1");

        // update_map returns the closure's value
        let prev = store
            .update_map(|m| {
                let prev = m.insert("a".to_string(), "10".to_string());
                Ok(prev)
            })
            .await?;
        assert_eq!(prev.as_deref(), Some("1"));
        assert_eq!(store.get(&"a".into()).await.unwrap(), "10");

        // remove and reload persistence
        let existed = store.remove(&"b".into()).await?;
        assert!(existed);
        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        assert_eq!(reloaded.list().await.len(), 1);
        assert_eq!(reloaded.get(&"a".into()).await.unwrap(), "10");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_map_error_leaves_map_unpersisted() -> Result<(), anyhow::Error> {
        let tmp = temp_path("json_map_store_err");
        let store = JsonMapStore::<String, u32>::new(&tmp).await?;
        store.insert("a".into(), 1).await?;

        let res: Result<(), _> = store
            .update_map(|_| Err(ServiceError::Validation("nope".into())))
            .await;
        assert!(res.is_err());

        let reloaded = JsonMapStore::<String, u32>::new(&tmp).await?;
        assert_eq!(reloaded.get(&"a".into()).await, Some(1));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
