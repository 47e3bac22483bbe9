//! Storage abstractions for service layer
//!
//! Contains reusable file-backed stores and helpers to avoid duplication
//! across services that persist small maps or documents as JSON.

pub mod json_map_store;
pub mod json_doc_store;
