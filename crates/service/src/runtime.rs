//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

/// Ensure the data and upload directories exist before stores open files.
pub async fn ensure_env(data_dir: &str, upload_dir: &str) -> anyhow::Result<()> {
    common::env::ensure_env(data_dir, upload_dir).await
}
