//! # Store Mocking
//!
//! Lets handler tests stand in for the [`StoreActor`](super::StoreActor):
//! [`create_mock_store`] hands out a real [`StoreClient`] whose requests land
//! on a receiver the test controls. The test then pulls each request with
//! [`expect_get`] / [`expect_apply`], asserts on it and answers through the
//! returned sender, which makes failure injection (a closed store, a
//! rejected change) trivial.
//!
//! ```rust
//! use command_sample::model::PersonalizedInfo;
//! use command_sample::store::mock::{create_mock_store, expect_get};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (client, mut requests) = create_mock_store::<PersonalizedInfo>(4);
//!
//!     let lookup = tokio::spawn(async move { client.get("me").await });
//!
//!     let (id, respond_to) = expect_get(&mut requests).await.expect("Expected Get request");
//!     assert_eq!(id, "me");
//!     respond_to.send(Ok(None)).unwrap();
//!
//!     assert!(lookup.await.unwrap().unwrap().is_none());
//! }
//! ```

use super::message::Response;
use super::{StoreClient, StoreRequest, StoredRecord};
use tokio::sync::mpsc;

/// Creates a client and the receiver its requests arrive on.
pub fn create_mock_store<T: StoredRecord>(
    buffer_size: usize,
) -> (StoreClient<T>, mpsc::Receiver<StoreRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Waits for the next request and returns it if it is a `Get`.
pub async fn expect_get<T: StoredRecord>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(String, Response<Option<T>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Waits for the next request and returns it if it is an `Apply`.
pub async fn expect_apply<T: StoredRecord>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(String, T::Change, Response<T>)> {
    match receiver.recv().await {
        Some(StoreRequest::Apply {
            id,
            change,
            respond_to,
        }) => Some((id, change, respond_to)),
        _ => None,
    }
}

/// Waits for the next request and returns it if it is a `List`.
pub async fn expect_list<T: StoredRecord>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<Response<Vec<T>>> {
    match receiver.recv().await {
        Some(StoreRequest::List { respond_to }) => Some(respond_to),
        _ => None,
    }
}
