//! # Command Framework
//!
//! The command-resolution and dispatch core of a device-cloud API. An inbound
//! request names a resource (`PersonalizedInfos`), a verb (`Patch`) and some
//! attributes; the framework finds the handler, checks the verb, runs it
//! without blocking other requests and answers with one uniform envelope.
//!
//! ## Architecture Overview
//!
//! ```text
//! CommandRequest ──► CommandResolver ──► Dispatcher ──► ResponseEnvelope
//!                     (name + verb)      (invoke, await,
//!                          │              normalize)
//!                          ▼
//!                    HandlerRegistry ──► HandlerFactory ──► CommandHandler
//! ```
//!
//! 1. **Contract** ([`CommandHandler`]): the verbs a resource implements, tagged by a [`VerbSet`].
//! 2. **Registry** ([`HandlerRegistry`]): resource name to handler factory, filled once at boot.
//! 3. **Resolver** ([`CommandResolver`]): verb parsing, lookup and capability check.
//! 4. **Dispatcher** ([`Dispatcher`]): isolated execution, time budget, cancellation, normalization.
//! 5. **Service** ([`CommandService`]): the facade a transport calls.
//!
//! ## Example
//!
//! ```rust
//! use command_framework::{
//!     CommandAttributes, CommandHandler, CommandRequest, CommandService, DispatchConfig,
//!     ErrorKind, HandlerError, HandlerRegistry, Resource, Verb, VerbSet,
//! };
//! use async_trait::async_trait;
//!
//! struct Greeting;
//!
//! #[async_trait]
//! impl CommandHandler for Greeting {
//!     fn verbs(&self) -> VerbSet {
//!         VerbSet::from([Verb::Get])
//!     }
//!
//!     async fn get(&self, _attributes: CommandAttributes) -> Result<Resource, HandlerError> {
//!         Ok(Resource::new().with("id", "hello").with("text", "hi"))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut registry = HandlerRegistry::new();
//!     registry.register_handler("Greetings", |_ctx| Greeting).unwrap();
//!     let service = CommandService::new(registry, DispatchConfig::default());
//!
//!     let ok = service.execute(CommandRequest::new("Greetings", "Get")).await;
//!     assert_eq!(ok.payload().unwrap().kind(), Some("weave#greeting"));
//!
//!     let refused = service.execute(CommandRequest::new("Greetings", "Patch")).await;
//!     assert_eq!(refused.error_kind(), Some(ErrorKind::UnsupportedVerb));
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - The registry is frozen behind an `Arc` once the service is built; reads take no lock.
//! - Each dispatch runs its handler in its own Tokio task, so one failing or
//!   panicking request never disturbs another.
//! - Operations on the same resource instance are not serialized here; that
//!   belongs to the storage collaborator.
//!
//! ## Testing
//!
//! See the [`mock`] module for a scripted handler that injects results,
//! failures, panics and delays.

pub mod context;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod mock;
pub mod registry;
pub mod resolver;
pub mod resource;
pub mod service;
pub mod tracing;
pub mod verb;

// Re-export core types for convenience
pub use context::RequestContext;
pub use dispatcher::{DispatchConfig, Dispatcher};
pub use envelope::ResponseEnvelope;
pub use error::{ErrorKind, HandlerError, RegistryError, ResolveError};
pub use handler::{factory, CommandHandler, HandlerFactory};
pub use registry::HandlerRegistry;
pub use resolver::{CommandResolver, ResolvedOperation};
pub use resource::{CommandAttributes, Resource, ResourceName};
pub use service::{CommandRequest, CommandService};
pub use tokio_util::sync::CancellationToken;
pub use verb::{Verb, VerbSet};
