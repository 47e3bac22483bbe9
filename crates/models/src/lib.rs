//! Domain types for the Prof backend.
//! - Plain serde structs matching the JSON shapes persisted on disk.
//! - Validation helpers live next to the type they check.

pub mod errors;
pub mod profile;
pub mod trade;
pub mod show;
pub mod message;
pub mod story;
