//! # Store Actor
//!
//! The server half of the store. It owns the records and the receiving end of
//! the channel and handles one request at a time, so the map needs no lock.
//!
//! The loop ends once every [`StoreClient`] has been dropped.

use super::{StoreClient, StoreError, StoreRequest, StoredRecord};
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct StoreActor<T: StoredRecord> {
    receiver: mpsc::Receiver<StoreRequest<T>>,
    records: BTreeMap<String, T>,
}

impl<T: StoredRecord> StoreActor<T> {
    /// Creates the actor and its client.
    ///
    /// `buffer_size` bounds the channel; senders wait while it is full.
    pub fn new(buffer_size: usize) -> (Self, StoreClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            records: BTreeMap::new(),
        };
        (actor, StoreClient::new(sender))
    }

    /// Preloads records before the loop starts.
    pub fn with_records(mut self, records: impl IntoIterator<Item = T>) -> Self {
        for record in records {
            self.records.insert(record.id().to_string(), record);
        }
        self
    }

    pub async fn run(mut self) {
        // "PersonalizedInfo" rather than the full path
        let record_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(record_type, size = self.records.len(), "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Get { id, respond_to } => {
                    let record = self.records.get(&id).cloned();
                    debug!(record_type, %id, found = record.is_some(), "Get");
                    let _ = respond_to.send(Ok(record));
                }
                StoreRequest::Apply {
                    id,
                    change,
                    respond_to,
                } => {
                    debug!(record_type, %id, ?change, "Apply");
                    let Some(record) = self.records.get_mut(&id) else {
                        warn!(record_type, %id, "Not found");
                        let _ = respond_to.send(Err(StoreError::NotFound(id)));
                        continue;
                    };
                    // Work on a copy so a refused change leaves the stored record as it was.
                    let mut next = record.clone();
                    match next.apply(change) {
                        Ok(()) => {
                            *record = next.clone();
                            info!(record_type, %id, "Applied");
                            let _ = respond_to.send(Ok(next));
                        }
                        Err(e) => {
                            warn!(record_type, %id, error = %e, "Change rejected");
                            let _ = respond_to.send(Err(StoreError::Rejected(Box::new(e))));
                        }
                    }
                }
                StoreRequest::Insert { record, respond_to } => {
                    let id = record.id().to_string();
                    let replaced = self.records.insert(id.clone(), record).is_some();
                    info!(record_type, %id, replaced, size = self.records.len(), "Inserted");
                    let _ = respond_to.send(Ok(replaced));
                }
                StoreRequest::List { respond_to } => {
                    debug!(record_type, size = self.records.len(), "List");
                    let _ = respond_to.send(Ok(self.records.values().cloned().collect()));
                }
            }
        }

        info!(record_type, size = self.records.len(), "Shutdown");
    }
}
