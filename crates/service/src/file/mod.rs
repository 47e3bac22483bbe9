//! File-persisted stores, one JSON file per concern under the data dir.

pub mod profile_store;
pub mod schedule_store;
pub mod message_store;
pub mod news_store;
