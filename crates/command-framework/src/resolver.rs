//! # Command Resolver
//!
//! Turns `(resource name, verb, attributes)` into a [`ResolvedOperation`], or
//! into a typed [`ResolveError`] before anything runs.
//!
//! ## Resolution order
//!
//! 1. Parse the verb. Unknown verb strings fail with `InvalidVerb` without
//!    touching the registry.
//! 2. Look the resource up. Missing names fail with `UnknownResource`.
//! 3. Build the handler for this request from its factory. A factory or
//!    `verbs()` that panics fails with `HandlerPanicked`.
//! 4. Check the handler's [`VerbSet`](crate::VerbSet). A missing verb fails
//!    with `UnsupportedVerb`, which callers can map to a different status
//!    than "not found".
//! 5. Bind the attributes and hand back the operation.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

use crate::context::RequestContext;
use crate::error::{HandlerError, ResolveError};
use crate::handler::CommandHandler;
use crate::registry::HandlerRegistry;
use crate::resource::{CommandAttributes, Resource, ResourceName};
use crate::verb::Verb;

/// A handler bound to one request, one verb and its attributes.
///
/// Nothing runs until [`invoke`](ResolvedOperation::invoke) is awaited.
pub struct ResolvedOperation {
    resource: ResourceName,
    verb: Verb,
    attributes: CommandAttributes,
    context: RequestContext,
    handler: Box<dyn CommandHandler>,
}

impl ResolvedOperation {
    pub fn resource(&self) -> &ResourceName {
        &self.resource
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn attributes(&self) -> &CommandAttributes {
        &self.attributes
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Runs the bound verb operation, consuming the handler.
    pub async fn invoke(self) -> Result<Resource, HandlerError> {
        self.handler.call(self.verb, self.attributes).await
    }
}

impl fmt::Debug for ResolvedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedOperation")
            .field("resource", &self.resource)
            .field("verb", &self.verb)
            .field("attributes", &self.attributes)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// Resolves requests against a frozen [`HandlerRegistry`].
#[derive(Clone, Debug)]
pub struct CommandResolver {
    registry: Arc<HandlerRegistry>,
}

impl CommandResolver {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Resolves a request whose verb arrives as a string.
    pub fn resolve(
        &self,
        name: &str,
        verb: &str,
        attributes: CommandAttributes,
        context: RequestContext,
    ) -> Result<ResolvedOperation, ResolveError> {
        let verb: Verb = verb.parse()?;
        self.resolve_verb(name, verb, attributes, context)
    }

    /// Resolves a request whose verb is already typed.
    pub fn resolve_verb(
        &self,
        name: &str,
        verb: Verb,
        attributes: CommandAttributes,
        context: RequestContext,
    ) -> Result<ResolvedOperation, ResolveError> {
        let (resource, build) = self.registry.lookup(name)?;
        let built = panic::catch_unwind(AssertUnwindSafe(|| {
            let handler = build(&context);
            let verbs = handler.verbs();
            (handler, verbs)
        }));
        let Ok((handler, verbs)) = built else {
            error!(resource = %resource, %verb, request_id = context.request_id(), "Handler factory panicked");
            return Err(ResolveError::HandlerPanicked(resource.to_string()));
        };

        if !verbs.contains(verb) {
            debug!(resource = %resource, %verb, supported = %verbs, "Unsupported verb");
            return Err(ResolveError::UnsupportedVerb {
                resource: resource.to_string(),
                verb,
            });
        }

        debug!(resource = %resource, %verb, request_id = context.request_id(), "Resolved");
        Ok(ResolvedOperation {
            resource: resource.clone(),
            verb,
            attributes,
            context,
            handler,
        })
    }
}
