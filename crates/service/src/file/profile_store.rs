use std::sync::Arc;

use chrono::Utc;
use models::profile::{canonical_email, Profile};
use tracing::debug;

use crate::errors::ServiceError;
use crate::storage::json_map_store::JsonMapStore;

/// File-backed store of user profiles, keyed by canonical email.
/// All balance movement goes through this store so that a multi-party
/// transfer happens under one write lock.
#[derive(Clone)]
pub struct ProfileStore {
    store: Arc<JsonMapStore<String, Profile>>,
}

impl ProfileStore {
    /// Initialize the store from the given file path. Creates the file if missing.
    pub async fn new<P: Into<std::path::PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::<String, Profile>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }

    /// Create a profile; fails if one already exists for the email.
    pub async fn create(&self, name: &str, email: &str) -> Result<Profile, ServiceError> {
        let profile = Profile::new(name, email)?;
        let key = profile.email.clone();
        self.store
            .update_map(|map| {
                if map.contains_key(&key) {
                    return Err(ServiceError::Conflict("user already exists".into()));
                }
                map.insert(key.clone(), profile.clone());
                Ok(())
            })
            .await?;
        debug!(email = %profile.email, "profile created");
        Ok(profile)
    }

    pub async fn get(&self, email: &str) -> Option<Profile> {
        self.store.get(&canonical_email(email)).await
    }

    pub async fn exists(&self, email: &str) -> bool {
        self.store.contains_key(&canonical_email(email)).await
    }

    /// Point the profile's image URL at a freshly uploaded file.
    pub async fn set_image_url(&self, email: &str, url: String) -> Result<Profile, ServiceError> {
        let key = canonical_email(email);
        self.store
            .update_map(|map| {
                let p = map.get_mut(&key).ok_or_else(|| ServiceError::not_found("user"))?;
                p.image_url = Some(url);
                Ok(p.clone())
            })
            .await
    }

    /// Overwrite the coin balance (the miner client reports its own total)
    /// and merge the optional mining counters.
    pub async fn update_balance(
        &self,
        email: &str,
        balance: f64,
        blocks_mined: Option<u64>,
        total_earned: Option<f64>,
    ) -> Result<Profile, ServiceError> {
        if !balance.is_finite() || balance < 0.0 {
            return Err(ServiceError::Validation("balance must be a non-negative number".into()));
        }
        let key = canonical_email(email);
        self.store
            .update_map(|map| {
                let p = map.get_mut(&key).ok_or_else(|| ServiceError::not_found("user"))?;
                p.profcoin_balance = balance;
                if let Some(b) = blocks_mined {
                    p.blocks_mined = b;
                }
                if let Some(t) = total_earned {
                    p.total_earned = t;
                }
                p.last_mining_update = Some(Utc::now());
                Ok(p.clone())
            })
            .await
    }

    /// Debit `amount` from the user's balance, failing without touching the
    /// file when funds are insufficient. This is the escrow hold for a
    /// proposed trade.
    pub async fn reserve(&self, email: &str, amount: f64) -> Result<(), ServiceError> {
        let key = canonical_email(email);
        self.store
            .update_map(|map| {
                let p = map.get_mut(&key).ok_or_else(|| ServiceError::not_found("user"))?;
                if p.profcoin_balance < amount {
                    return Err(ServiceError::Validation("insufficient balance".into()));
                }
                p.profcoin_balance -= amount;
                Ok(())
            })
            .await?;
        debug!(email = %key, amount, "escrow reserved");
        Ok(())
    }

    /// Credit `amount` to the user's balance. Used both to settle an
    /// accepted trade (recipient) and to refund a rejected or cancelled
    /// one (sender).
    pub async fn credit(&self, email: &str, amount: f64) -> Result<(), ServiceError> {
        let key = canonical_email(email);
        self.store
            .update_map(|map| {
                let p = map.get_mut(&key).ok_or_else(|| ServiceError::not_found("user"))?;
                p.profcoin_balance += amount;
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn temp_store() -> Arc<ProfileStore> {
        let tmp = std::env::temp_dir().join(format!("profiles_{}.json", Uuid::new_v4()));
        ProfileStore::new(&tmp).await.expect("store init")
    }

    #[tokio::test]
    async fn create_and_duplicate() {
        let store = temp_store().await;
        let p = store.create("Alice", "Alice@Example.com").await.expect("create");
        assert_eq!(p.email, "alice@example.com");

        // same address, different case
        let dup = store.create("Alice", "alice@example.COM").await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));

        assert!(store.exists("ALICE@example.com").await);
        assert!(store.get("nobody@example.com").await.is_none());
    }

    #[tokio::test]
    async fn balance_update_stamps_mining_time() {
        let store = temp_store().await;
        store.create("Bob", "bob@x.c").await.expect("create");

        let p = store.update_balance("bob@x.c", 42.5, Some(3), None).await.expect("update");
        assert_eq!(p.profcoin_balance, 42.5);
        assert_eq!(p.blocks_mined, 3);
        assert!(p.last_mining_update.is_some());

        assert!(store.update_balance("bob@x.c", -1.0, None, None).await.is_err());
        assert!(matches!(
            store.update_balance("ghost@x.c", 1.0, None, None).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn reserve_and_credit_conserve_coins() {
        let store = temp_store().await;
        store.create("A", "a@x.c").await.expect("create");
        store.create("B", "b@x.c").await.expect("create");
        store.update_balance("a@x.c", 10.0, None, None).await.expect("fund");

        store.reserve("a@x.c", 4.0).await.expect("reserve");
        assert_eq!(store.get("a@x.c").await.unwrap().profcoin_balance, 6.0);

        // over-reserve fails and leaves the balance alone
        assert!(matches!(
            store.reserve("a@x.c", 100.0).await,
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(store.get("a@x.c").await.unwrap().profcoin_balance, 6.0);

        store.credit("b@x.c", 4.0).await.expect("credit");
        assert_eq!(store.get("b@x.c").await.unwrap().profcoin_balance, 4.0);
    }
}
