//! # CommandHandler Trait
//!
//! The `CommandHandler` trait defines the contract every resource handler
//! (PersonalizedInfos, AuthorizedApps, …) implements to be reachable through
//! the dispatch core. A handler answers some subset of the [`Verb`]s and says
//! which ones through [`CommandHandler::verbs`].
//!
//! # Provided Methods
//! `get`, `patch` and `update` all have default bodies that return
//! [`HandlerError::NotImplemented`]. Override the ones you list in `verbs()`.
//! The resolver never invokes a verb that is missing from `verbs()`, so the
//! defaults are only reached when the two disagree.
//!
//! # Lifecycle
//! Handlers are built by a [`HandlerFactory`] once per request, bound to that
//! request's [`RequestContext`], and dropped when the request is answered.
//! All operations take `&self`: a handler cannot carry state from one request
//! to the next.

use async_trait::async_trait;
use std::sync::Arc;

use crate::context::RequestContext;
use crate::error::HandlerError;
use crate::resource::{CommandAttributes, Resource};
use crate::verb::{Verb, VerbSet};

/// Contract every resource handler satisfies.
///
/// ```rust
/// use command_framework::{CommandAttributes, CommandHandler, HandlerError, Resource, Verb, VerbSet};
/// use async_trait::async_trait;
///
/// struct Clock;
///
/// #[async_trait]
/// impl CommandHandler for Clock {
///     fn verbs(&self) -> VerbSet {
///         VerbSet::from([Verb::Get])
///     }
///
///     async fn get(&self, _attributes: CommandAttributes) -> Result<Resource, HandlerError> {
///         Ok(Resource::new().with("id", "clock").with("kind", "demo#clock").with("ticks", 42))
///     }
/// }
/// ```
#[async_trait]
pub trait CommandHandler: Send + Sync + 'static {
    /// The verbs this handler implements.
    fn verbs(&self) -> VerbSet;

    /// Retrieves the current state. Must not mutate anything.
    async fn get(&self, _attributes: CommandAttributes) -> Result<Resource, HandlerError> {
        Err(HandlerError::NotImplemented(Verb::Get))
    }

    /// Applies the fields present in `attributes`, leaving the rest untouched,
    /// and returns the full resulting representation.
    async fn patch(&self, _attributes: CommandAttributes) -> Result<Resource, HandlerError> {
        Err(HandlerError::NotImplemented(Verb::Patch))
    }

    /// Replaces the mutable fields with `attributes`; omitted fields revert
    /// to their defaults.
    async fn update(&self, _attributes: CommandAttributes) -> Result<Resource, HandlerError> {
        Err(HandlerError::NotImplemented(Verb::Update))
    }

    /// Runs `verb` against this handler.
    async fn call(&self, verb: Verb, attributes: CommandAttributes) -> Result<Resource, HandlerError> {
        match verb {
            Verb::Get => self.get(attributes).await,
            Verb::Patch => self.patch(attributes).await,
            Verb::Update => self.update(attributes).await,
        }
    }
}

/// Builds a handler bound to one request.
pub type HandlerFactory = Arc<dyn Fn(&RequestContext) -> Box<dyn CommandHandler> + Send + Sync>;

/// Wraps a closure returning a concrete handler into a [`HandlerFactory`].
pub fn factory<H, F>(build: F) -> HandlerFactory
where
    H: CommandHandler,
    F: Fn(&RequestContext) -> H + Send + Sync + 'static,
{
    Arc::new(move |ctx: &RequestContext| Box::new(build(ctx)) as Box<dyn CommandHandler>)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ReadOnly;

    #[async_trait]
    impl CommandHandler for ReadOnly {
        fn verbs(&self) -> VerbSet {
            VerbSet::from([Verb::Get])
        }

        async fn get(&self, attributes: CommandAttributes) -> Result<Resource, HandlerError> {
            let id = attributes.get_str("id").unwrap_or("me").to_string();
            Ok(Resource::new().with("id", id).with("kind", "test#readOnly"))
        }
    }

    #[tokio::test]
    async fn test_call_routes_to_verb() {
        let handler = ReadOnly;
        let attrs = CommandAttributes::new().with("id", "abc");
        let resource = handler.call(Verb::Get, attrs).await.unwrap();
        assert_eq!(resource.id(), Some("abc"));
    }

    #[tokio::test]
    async fn test_default_bodies_report_not_implemented() {
        let handler = ReadOnly;
        let err = handler
            .call(Verb::Update, CommandAttributes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::NotImplemented(Verb::Update)));
    }

    #[test]
    fn test_factory_builds_fresh_handlers() {
        let build = factory(|_ctx| ReadOnly);
        let first = build(&RequestContext::new(1));
        let second = build(&RequestContext::new(2));
        assert!(first.verbs().contains(Verb::Get));
        assert!(!second.verbs().contains(Verb::Patch));
    }
}
