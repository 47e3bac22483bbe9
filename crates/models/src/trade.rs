use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A peer-to-peer coin trade. The proposed amount is held in escrow from
/// the moment the trade is created until it is accepted, rejected or
/// cancelled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: Uuid,
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
    pub note: String,
    pub status: TradeStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Trade {
    pub fn new(sender: String, recipient: String, amount: f64, note: String) -> Result<Self, ModelError> {
        validate_amount(amount)?;
        if sender == recipient {
            return Err(ModelError::Validation("cannot trade with yourself".into()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            sender,
            recipient,
            amount,
            note,
            status: TradeStatus::Pending,
            created_at: Utc::now(),
            updated_at: None,
        })
    }
}

pub fn validate_amount(amount: f64) -> Result<(), ModelError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ModelError::Validation("amount must be a positive number".into()));
    }
    Ok(())
}
