//! # Store Client

use super::{StoreError, StoreRequest, StoredRecord};
use tokio::sync::{mpsc, oneshot};

/// Async handle to a [`StoreActor`](super::StoreActor). Holds only a sender,
/// so clones are cheap and can be moved into every handler instance.
#[derive(Clone)]
pub struct StoreClient<T: StoredRecord> {
    sender: mpsc::Sender<StoreRequest<T>>,
}

impl<T: StoredRecord> StoreClient<T> {
    pub fn new(sender: mpsc::Sender<StoreRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn get(&self, id: impl Into<String>) -> Result<Option<T>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Get {
                id: id.into(),
                respond_to,
            })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    /// Applies `change` to the record stored under `id` and returns the result.
    pub async fn apply(&self, id: impl Into<String>, change: T::Change) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Apply {
                id: id.into(),
                change,
                respond_to,
            })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    pub async fn insert(&self, record: T) -> Result<bool, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Insert { record, respond_to })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    /// All records, ordered by id.
    pub async fn list(&self) -> Result<Vec<T>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::List { respond_to })
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }
}
