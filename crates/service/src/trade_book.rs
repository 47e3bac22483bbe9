use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use models::profile::canonical_email;
use models::trade::{Trade, TradeStatus};
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::file::profile_store::ProfileStore;

/// In-memory book of peer trades. Trades are process-local and do not
/// survive a restart; escrowed amounts are only returned through reject or
/// cancel, so the book should be drained before shutting down.
///
/// Settlement invariant: a trade's status is flipped away from `Pending`
/// under the map's shard lock *before* any balance is moved, so two racing
/// decisions can never settle the same trade twice.
pub struct TradeBook {
    trades: DashMap<Uuid, Trade>,
}

impl TradeBook {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { trades: DashMap::new() })
    }

    /// Propose a trade. The amount is debited from the sender immediately
    /// (the escrow hold); it comes back only via reject or cancel.
    pub async fn propose(
        &self,
        profiles: &ProfileStore,
        sender: &str,
        recipient: &str,
        amount: f64,
        note: &str,
    ) -> Result<Trade, ServiceError> {
        let sender = canonical_email(sender);
        let recipient = canonical_email(recipient);
        let trade = Trade::new(sender.clone(), recipient.clone(), amount, note.to_string())?;

        if !profiles.exists(&sender).await {
            return Err(ServiceError::NotFound("sender not found".into()));
        }
        if !profiles.exists(&recipient).await {
            return Err(ServiceError::NotFound("recipient not found".into()));
        }
        profiles.reserve(&sender, amount).await?;

        self.trades.insert(trade.id, trade.clone());
        info!(trade = %trade.id, %sender, %recipient, amount, "trade proposed");
        Ok(trade)
    }

    /// Trades involving the user, either side, newest first.
    pub fn for_user(&self, email: &str) -> Vec<Trade> {
        let email = canonical_email(email);
        let mut trades: Vec<Trade> = self
            .trades
            .iter()
            .filter(|t| t.sender == email || t.recipient == email)
            .map(|t| t.clone())
            .collect();
        trades.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        trades
    }

    /// All pending trades (the marketplace view), newest first.
    pub fn pending(&self) -> Vec<Trade> {
        let mut trades: Vec<Trade> = self
            .trades
            .iter()
            .filter(|t| t.status == TradeStatus::Pending)
            .map(|t| t.clone())
            .collect();
        trades.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        trades
    }

    /// Accept or reject a pending trade. Only the recipient may decide.
    /// Accept credits the recipient with the escrowed amount; reject
    /// refunds the sender.
    pub async fn resolve(
        &self,
        profiles: &ProfileStore,
        id: Uuid,
        status: TradeStatus,
        actor: &str,
    ) -> Result<Trade, ServiceError> {
        if status == TradeStatus::Pending {
            return Err(ServiceError::Validation("invalid status".into()));
        }
        let actor = canonical_email(actor);

        // Claim the trade under the shard lock; the guard must drop before
        // the balance await below.
        let trade = {
            let mut entry = self
                .trades
                .get_mut(&id)
                .ok_or_else(|| ServiceError::not_found("trade"))?;
            if entry.recipient != actor {
                return Err(ServiceError::Forbidden("not the recipient of this trade".into()));
            }
            if entry.status != TradeStatus::Pending {
                return Err(ServiceError::Validation("trade already processed".into()));
            }
            entry.status = status;
            entry.updated_at = Some(Utc::now());
            entry.clone()
        };

        let credit_to = match status {
            TradeStatus::Accepted => trade.recipient.as_str(),
            TradeStatus::Rejected => trade.sender.as_str(),
            TradeStatus::Pending => unreachable!(),
        };
        if let Err(e) = profiles.credit(credit_to, trade.amount).await {
            // The escrowed amount never moved; reopen the trade so it can
            // settle once the credit can land.
            if let Some(mut entry) = self.trades.get_mut(&id) {
                entry.status = TradeStatus::Pending;
                entry.updated_at = None;
            }
            return Err(e);
        }
        info!(trade = %trade.id, status = ?status, "trade settled");
        Ok(trade)
    }

    /// Cancel a pending trade. Only the sender may cancel; the escrowed
    /// amount is refunded and the trade disappears from the book.
    pub async fn cancel(
        &self,
        profiles: &ProfileStore,
        id: Uuid,
        actor: &str,
    ) -> Result<(), ServiceError> {
        let actor = canonical_email(actor);

        let trade = {
            let mut entry = self
                .trades
                .get_mut(&id)
                .ok_or_else(|| ServiceError::not_found("trade"))?;
            if entry.sender != actor {
                return Err(ServiceError::Forbidden("not the sender of this trade".into()));
            }
            if entry.status != TradeStatus::Pending {
                return Err(ServiceError::Validation("cannot cancel processed trade".into()));
            }
            // claim settlement before the refund await
            entry.status = TradeStatus::Rejected;
            entry.clone()
        };

        if let Err(e) = profiles.credit(&trade.sender, trade.amount).await {
            // Failed refund: reopen instead of dropping the escrow on the floor.
            if let Some(mut entry) = self.trades.get_mut(&id) {
                entry.status = TradeStatus::Pending;
            }
            return Err(e);
        }
        self.trades.remove(&id);
        info!(trade = %id, "trade cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn funded_profiles() -> Arc<ProfileStore> {
        let tmp = std::env::temp_dir().join(format!("trade_profiles_{}.json", Uuid::new_v4()));
        let profiles = ProfileStore::new(&tmp).await.expect("store init");
        profiles.create("Alice", "alice@x.c").await.expect("create");
        profiles.create("Bob", "bob@x.c").await.expect("create");
        profiles.update_balance("alice@x.c", 100.0, None, None).await.expect("fund");
        profiles
    }

    #[tokio::test]
    async fn propose_escrows_the_amount() {
        let profiles = funded_profiles().await;
        let book = TradeBook::new();

        let trade = book
            .propose(&profiles, "alice@x.c", "bob@x.c", 30.0, "for pizza")
            .await
            .expect("propose");
        assert_eq!(trade.status, TradeStatus::Pending);
        assert_eq!(profiles.get("alice@x.c").await.unwrap().profcoin_balance, 70.0);
        assert_eq!(book.pending().len(), 1);
        assert_eq!(book.for_user("bob@x.c").len(), 1);
    }

    #[tokio::test]
    async fn propose_rejects_unknown_parties_and_overdraft() {
        let profiles = funded_profiles().await;
        let book = TradeBook::new();

        assert!(matches!(
            book.propose(&profiles, "ghost@x.c", "bob@x.c", 1.0, "").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            book.propose(&profiles, "alice@x.c", "ghost@x.c", 1.0, "").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            book.propose(&profiles, "alice@x.c", "bob@x.c", 1000.0, "").await,
            Err(ServiceError::Validation(_))
        ));
        // failed proposals leave no escrow behind
        assert_eq!(profiles.get("alice@x.c").await.unwrap().profcoin_balance, 100.0);
    }

    #[tokio::test]
    async fn accept_credits_the_recipient() {
        let profiles = funded_profiles().await;
        let book = TradeBook::new();
        let trade = book
            .propose(&profiles, "alice@x.c", "bob@x.c", 25.0, "")
            .await
            .expect("propose");

        // only the recipient may decide
        assert!(matches!(
            book.resolve(&profiles, trade.id, TradeStatus::Accepted, "alice@x.c").await,
            Err(ServiceError::Forbidden(_))
        ));

        let settled = book
            .resolve(&profiles, trade.id, TradeStatus::Accepted, "bob@x.c")
            .await
            .expect("accept");
        assert_eq!(settled.status, TradeStatus::Accepted);
        assert!(settled.updated_at.is_some());
        assert_eq!(profiles.get("bob@x.c").await.unwrap().profcoin_balance, 25.0);
        assert_eq!(profiles.get("alice@x.c").await.unwrap().profcoin_balance, 75.0);

        // a settled trade cannot settle again
        assert!(matches!(
            book.resolve(&profiles, trade.id, TradeStatus::Rejected, "bob@x.c").await,
            Err(ServiceError::Validation(_))
        ));
        assert!(book.pending().is_empty());
    }

    #[tokio::test]
    async fn reject_refunds_the_sender() {
        let profiles = funded_profiles().await;
        let book = TradeBook::new();
        let trade = book
            .propose(&profiles, "alice@x.c", "bob@x.c", 25.0, "")
            .await
            .expect("propose");

        book.resolve(&profiles, trade.id, TradeStatus::Rejected, "bob@x.c")
            .await
            .expect("reject");
        assert_eq!(profiles.get("alice@x.c").await.unwrap().profcoin_balance, 100.0);
        assert_eq!(profiles.get("bob@x.c").await.unwrap().profcoin_balance, 0.0);
    }

    #[tokio::test]
    async fn failed_credit_reopens_the_trade() {
        let profiles = funded_profiles().await;
        let book = TradeBook::new();
        let trade = book
            .propose(&profiles, "alice@x.c", "bob@x.c", 10.0, "")
            .await
            .expect("propose");

        // a store that has never seen bob: the credit cannot land
        let tmp = std::env::temp_dir().join(format!("trade_profiles_{}.json", Uuid::new_v4()));
        let strangers = ProfileStore::new(&tmp).await.expect("store init");
        assert!(matches!(
            book.resolve(&strangers, trade.id, TradeStatus::Accepted, "bob@x.c").await,
            Err(ServiceError::NotFound(_))
        ));

        // still pending, and it settles once the credit can land
        assert_eq!(book.pending().len(), 1);
        let settled = book
            .resolve(&profiles, trade.id, TradeStatus::Accepted, "bob@x.c")
            .await
            .expect("accept");
        assert_eq!(settled.status, TradeStatus::Accepted);
        assert_eq!(profiles.get("bob@x.c").await.unwrap().profcoin_balance, 10.0);
    }

    #[tokio::test]
    async fn failed_refund_keeps_the_trade_open() {
        let profiles = funded_profiles().await;
        let book = TradeBook::new();
        let trade = book
            .propose(&profiles, "alice@x.c", "bob@x.c", 10.0, "")
            .await
            .expect("propose");

        let tmp = std::env::temp_dir().join(format!("trade_profiles_{}.json", Uuid::new_v4()));
        let strangers = ProfileStore::new(&tmp).await.expect("store init");
        assert!(book.cancel(&strangers, trade.id, "alice@x.c").await.is_err());
        assert_eq!(book.pending().len(), 1);

        book.cancel(&profiles, trade.id, "alice@x.c").await.expect("cancel");
        assert_eq!(profiles.get("alice@x.c").await.unwrap().profcoin_balance, 100.0);
        assert!(book.for_user("alice@x.c").is_empty());
    }

    #[tokio::test]
    async fn cancel_refunds_and_removes() {
        let profiles = funded_profiles().await;
        let book = TradeBook::new();
        let trade = book
            .propose(&profiles, "alice@x.c", "bob@x.c", 10.0, "")
            .await
            .expect("propose");

        // only the sender may cancel
        assert!(matches!(
            book.cancel(&profiles, trade.id, "bob@x.c").await,
            Err(ServiceError::Forbidden(_))
        ));

        book.cancel(&profiles, trade.id, "alice@x.c").await.expect("cancel");
        assert_eq!(profiles.get("alice@x.c").await.unwrap().profcoin_balance, 100.0);
        assert!(book.for_user("alice@x.c").is_empty());
        assert!(matches!(
            book.cancel(&profiles, trade.id, "alice@x.c").await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
