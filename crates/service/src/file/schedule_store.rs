use std::sync::Arc;

use chrono::{Timelike, Utc};
use models::profile::canonical_email;
use models::show::{Show, SLOT_COUNT};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::ServiceError;
use crate::storage::json_doc_store::JsonDocStore;

/// The persisted schedule board: one optional show per UTC hour.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Board {
    pub slots: Vec<Option<Show>>,
}

impl Default for Board {
    fn default() -> Self {
        Self { slots: vec![None; SLOT_COUNT] }
    }
}

/// File-backed station schedule. Enforces one show per host and keeps the
/// board at exactly `SLOT_COUNT` entries.
#[derive(Clone)]
pub struct ScheduleStore {
    store: Arc<JsonDocStore<Board>>,
}

impl ScheduleStore {
    pub async fn new<P: Into<std::path::PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonDocStore::<Board>::new(path).await?;
        // A hand-edited file may carry the wrong number of slots; fix it up
        // once so every other operation can index freely.
        store
            .update(|board| {
                board.slots.resize(SLOT_COUNT, None);
                Ok(())
            })
            .await?;
        Ok(Arc::new(Self { store }))
    }

    /// The full board, free slots included.
    pub async fn board(&self) -> Vec<Option<Show>> {
        self.store.read(|b| b.slots.clone()).await
    }

    /// The show occupying the current UTC hour, if any.
    pub async fn on_air(&self) -> Option<Show> {
        let hour = Utc::now().hour() as usize;
        self.store.read(|b| b.slots.get(hour).cloned().flatten()).await
    }

    /// Claim a slot for a show. Without an explicit slot the first free one
    /// (lowest hour) is taken. A host can hold at most one show.
    pub async fn claim(
        &self,
        host: &str,
        title: &str,
        slot: Option<usize>,
    ) -> Result<(usize, Show), ServiceError> {
        if title.trim().is_empty() {
            return Err(ServiceError::Validation("show title required".into()));
        }
        if let Some(s) = slot {
            check_slot(s)?;
        }
        let host = canonical_email(host);
        let show = Show::new(host.clone(), title.trim().to_string());

        let claimed = self
            .store
            .update(|board| {
                if board.slots.iter().flatten().any(|s| s.host == host) {
                    return Err(ServiceError::Conflict("host already has a show".into()));
                }
                let idx = match slot {
                    Some(s) => {
                        if board.slots[s].is_some() {
                            return Err(ServiceError::Conflict("slot already taken".into()));
                        }
                        s
                    }
                    None => board
                        .slots
                        .iter()
                        .position(Option::is_none)
                        .ok_or_else(|| ServiceError::Conflict("schedule is full".into()))?,
                };
                board.slots[idx] = Some(show.clone());
                Ok(idx)
            })
            .await?;

        info!(%host, slot = claimed, "show claimed");
        Ok((claimed, show))
    }

    /// Exchange the contents of two slots. The requester must host the
    /// `from` slot; `to` may be free, in which case the show simply moves.
    pub async fn swap(&self, host: &str, from: usize, to: usize) -> Result<(), ServiceError> {
        check_slot(from)?;
        check_slot(to)?;
        if from == to {
            return Err(ServiceError::Validation("cannot swap a slot with itself".into()));
        }
        let host = canonical_email(host);
        self.store
            .update(|board| {
                match &board.slots[from] {
                    None => return Err(ServiceError::not_found("show")),
                    Some(s) if s.host != host => {
                        return Err(ServiceError::Forbidden("only the host may move a show".into()))
                    }
                    Some(_) => {}
                }
                board.slots.swap(from, to);
                Ok(())
            })
            .await
    }

    /// Free a slot. Only the host of the occupying show may release it.
    pub async fn release(&self, host: &str, slot: usize) -> Result<(), ServiceError> {
        check_slot(slot)?;
        let host = canonical_email(host);
        self.store
            .update(|board| {
                match &board.slots[slot] {
                    None => return Err(ServiceError::not_found("show")),
                    Some(s) if s.host != host => {
                        return Err(ServiceError::Forbidden("only the host may release a show".into()))
                    }
                    Some(_) => {}
                }
                board.slots[slot] = None;
                Ok(())
            })
            .await
    }
}

fn check_slot(slot: usize) -> Result<(), ServiceError> {
    if slot >= SLOT_COUNT {
        return Err(ServiceError::Validation(format!("slot must be in 0..{SLOT_COUNT}")));
    }
    Ok(())
}
