//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and type definitions in the `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod file;
pub mod trade_book;
