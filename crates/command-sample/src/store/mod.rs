//! # Record Store
//!
//! The storage collaborator behind the sample handlers. A [`StoreActor`] owns
//! every record of one type and processes requests one at a time, so two
//! commands addressing the same record (a Patch racing an Update, say) are
//! applied in arrival order and never interleave.
//!
//! Handlers talk to it through a cloneable [`StoreClient`].
//!
//! ```rust
//! use command_sample::model::{PersonalizedInfo, PersonalizedInfoChange, PersonalizedInfoPatch};
//! use command_sample::store::StoreActor;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = StoreActor::<PersonalizedInfo>::new(10);
//!     tokio::spawn(actor.run());
//!
//!     client.insert(PersonalizedInfo::new("me")).await.unwrap();
//!     let patch = PersonalizedInfoPatch {
//!         location: Some("Study".into()),
//!         ..Default::default()
//!     };
//!     let record = client
//!         .apply("me", PersonalizedInfoChange::Patch(patch))
//!         .await
//!         .unwrap();
//!     assert_eq!(record.location, "Study");
//! }
//! ```

pub mod actor;
pub mod client;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::StoreActor;
pub use client::StoreClient;
pub use error::StoreError;
pub use message::StoreRequest;

use std::fmt::Debug;

/// A record that can live in a [`StoreActor`].
pub trait StoredRecord: Clone + Debug + Send + Sync + 'static {
    /// The mutation a client may request.
    type Change: Debug + Send + 'static;
    /// Why a change was refused.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Key the record is stored under.
    fn id(&self) -> &str;

    /// Applies `change` in place. On error the record must be left untouched.
    fn apply(&mut self, change: Self::Change) -> Result<(), Self::Error>;
}
