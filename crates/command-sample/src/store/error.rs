//! # Store Errors

/// Errors that can occur talking to a [`StoreActor`](super::StoreActor).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store closed")]
    Closed,
    #[error("Store dropped response channel")]
    Dropped,
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Change rejected: {0}")]
    Rejected(Box<dyn std::error::Error + Send + Sync>),
}
