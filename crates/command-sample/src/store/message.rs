//! # Store Messages
//!
//! Requests sent from a [`StoreClient`](super::StoreClient) to its
//! [`StoreActor`](super::StoreActor). Each carries a oneshot sender the
//! actor answers on.

use super::{StoreError, StoredRecord};
use tokio::sync::oneshot;

/// One-shot response channel used by the store.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

#[derive(Debug)]
pub enum StoreRequest<T: StoredRecord> {
    Get {
        id: String,
        respond_to: Response<Option<T>>,
    },
    Apply {
        id: String,
        change: T::Change,
        respond_to: Response<T>,
    },
    /// Inserts or replaces; answers `true` when a record was replaced.
    Insert {
        record: T,
        respond_to: Response<bool>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
}
