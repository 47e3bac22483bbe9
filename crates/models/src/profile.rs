use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// A campus user profile, stored keyed by canonical email.
/// Field names stay camelCase on the wire; the frontend reads the raw JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub profcoin_balance: f64,
    #[serde(default)]
    pub blocks_mined: u64,
    #[serde(default)]
    pub total_earned: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_mining_update: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(name: &str, email: &str) -> Result<Self, ModelError> {
        validate_email(email)?;
        validate_name(name)?;
        Ok(Self {
            name: name.trim().to_string(),
            email: canonical_email(email),
            image_url: None,
            profcoin_balance: 0.0,
            blocks_mined: 0,
            total_earned: 0.0,
            last_mining_update: None,
            created_at: Utc::now(),
        })
    }
}

/// Canonical form used as the storage key: trimmed, lowercased.
pub fn canonical_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let e = email.trim();
    if e.is_empty() || !e.contains('@') {
        return Err(ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_canonicalizes_email() {
        let p = Profile::new("Alice", "  Alice@Example.COM ").expect("valid");
        assert_eq!(p.email, "alice@example.com");
        assert_eq!(p.profcoin_balance, 0.0);
        assert!(p.image_url.is_none());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Profile::new("", "a@b.c").is_err());
        assert!(Profile::new("Bob", "not-an-email").is_err());
        assert!(Profile::new("Bob", "   ").is_err());
    }

    #[test]
    fn wire_names_are_camel_case() {
        let p = Profile::new("Alice", "a@b.c").expect("valid");
        let v = serde_json::to_value(&p).expect("json");
        assert!(v.get("profcoinBalance").is_some());
        assert!(v.get("blocksMined").is_some());
        assert!(v.get("createdAt").is_some());
    }
}
