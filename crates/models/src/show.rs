use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The broadcast day is divided into hourly slots, one per UTC hour.
pub const SLOT_COUNT: usize = 24;

/// A claimed show on the station schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Show {
    pub host: String,
    pub title: String,
    pub claimed_at: DateTime<Utc>,
}

impl Show {
    pub fn new(host: String, title: String) -> Self {
        Self { host, title, claimed_at: Utc::now() }
    }
}
