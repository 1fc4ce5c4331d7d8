//! # Dispatcher
//!
//! Executes a [`ResolvedOperation`] and normalizes whatever happens into a
//! [`ResponseEnvelope`].
//!
//! ## Concurrency Model
//!
//! Every dispatch spawns the handler's future on its own Tokio task and then
//! races three things:
//!
//! - the task finishing (success, business failure, internal failure or panic),
//! - the request's time budget running out,
//! - the request's cancellation token firing.
//!
//! If the budget or the token wins, the task is aborted and its eventual
//! result is dropped with it, so a request produces exactly one envelope.
//! Dropping the dispatch future aborts the task as well. Handlers are not
//! expected to notice cancellation themselves.
//!
//! Because each operation lives in its own task, a panicking handler only
//! takes its own request down. The dispatcher holds no lock and no shared
//! mutable state.

use std::time::Duration;
use tokio::task::JoinError;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::envelope::ResponseEnvelope;
use crate::error::{ErrorKind, HandlerError};
use crate::resolver::ResolvedOperation;
use crate::resource::{Resource, ResourceName, ID_FIELD, KIND_FIELD};

/// Namespace used for synthesized kinds when none is configured.
pub const DEFAULT_NAMESPACE: &str = "weave";
/// Time budget used when neither the config nor the request sets one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Dispatcher settings supplied by the bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Namespace for kinds synthesized as `"<namespace>#<resourceType>"`.
    pub namespace: String,
    /// Budget applied to requests that carry no timeout of their own.
    pub default_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            default_timeout: DEFAULT_TIMEOUT,
        }
    }
}

enum Outcome {
    Finished(Result<Result<Resource, HandlerError>, JoinError>),
    TimedOut(Duration),
    Cancelled,
}

#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Runs `op` to completion, expiry or cancellation.
    pub async fn dispatch(&self, op: ResolvedOperation) -> ResponseEnvelope {
        let resource = op.resource().clone();
        let verb = op.verb();
        let request_id = op.context().request_id();
        let budget = op.context().timeout().unwrap_or(self.config.default_timeout);
        let cancel = op.context().cancellation().clone();
        let fallback_id = op.attributes().get_str(ID_FIELD).map(str::to_string);

        let span = info_span!("dispatch", request_id, resource = %resource, %verb);
        async move {
            debug!(attributes = ?op.attributes(), "Dispatch");

            let mut task = AbortOnDropHandle::new(tokio::spawn(op.invoke().in_current_span()));
            let outcome = tokio::select! {
                biased;
                joined = &mut task => Outcome::Finished(joined),
                _ = cancel.cancelled() => Outcome::Cancelled,
                _ = tokio::time::sleep(budget) => Outcome::TimedOut(budget),
            };

            match outcome {
                Outcome::Finished(Ok(Ok(payload))) => {
                    self.normalize(&resource, payload, fallback_id)
                }
                Outcome::Finished(Ok(Err(HandlerError::Business { code, message }))) => {
                    warn!(%code, %message, "Business failure");
                    ResponseEnvelope::business(code, message)
                }
                Outcome::Finished(Ok(Err(e))) => {
                    error!(error = %e, "Handler failed");
                    ResponseEnvelope::internal()
                }
                Outcome::Finished(Err(e)) => {
                    if e.is_panic() {
                        error!(error = %e, "Handler panicked");
                    } else {
                        error!(error = %e, "Handler task aborted");
                    }
                    ResponseEnvelope::internal()
                }
                Outcome::TimedOut(budget) => {
                    task.abort();
                    warn!(?budget, "Timed out");
                    ResponseEnvelope::failure(
                        ErrorKind::Timeout,
                        format!("{resource} {verb} exceeded {}ms", budget.as_millis()),
                    )
                }
                Outcome::Cancelled => {
                    task.abort();
                    warn!("Cancelled");
                    ResponseEnvelope::failure(
                        ErrorKind::Timeout,
                        format!("{resource} {verb} was cancelled"),
                    )
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Ensures a success payload carries `id` and `kind`.
    ///
    /// A missing `kind` is synthesized from the resource name. A missing `id`
    /// falls back to the `id` attribute of the request; without either the
    /// payload is unaddressable and the dispatch fails.
    fn normalize(
        &self,
        resource: &ResourceName,
        mut payload: Resource,
        fallback_id: Option<String>,
    ) -> ResponseEnvelope {
        if payload.kind().is_none() {
            let kind = resource.kind(&self.config.namespace);
            warn!(%kind, "Handler omitted kind, synthesizing");
            payload.insert(KIND_FIELD, kind);
        }

        let has_id = payload.get(ID_FIELD).is_some_and(|id| !id.is_null());
        if !has_id {
            match fallback_id {
                Some(id) => {
                    warn!(%id, "Handler omitted id, using request attribute");
                    payload.insert(ID_FIELD, id);
                }
                None => {
                    error!("Handler returned a payload without id");
                    return ResponseEnvelope::internal();
                }
            }
        }

        info!(id = ?payload.get(ID_FIELD), "Ok");
        ResponseEnvelope::success(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::handler::CommandHandler;
    use crate::registry::HandlerRegistry;
    use crate::resolver::CommandResolver;
    use crate::resource::CommandAttributes;
    use crate::verb::{Verb, VerbSet};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Returns whatever the attributes describe, or fails on request.
    struct Scripted;

    #[async_trait]
    impl CommandHandler for Scripted {
        fn verbs(&self) -> VerbSet {
            VerbSet::all()
        }

        async fn get(&self, attributes: CommandAttributes) -> Result<Resource, HandlerError> {
            match attributes.get_str("mode") {
                Some("business") => Err(HandlerError::business("locked", "resource locked")),
                Some("internal") => Err(HandlerError::internal("disk on fire")),
                Some("panic") => panic!("handler blew up"),
                Some("bare") => Ok(Resource::new().with("location", "Study")),
                _ => Ok(Resource::new().with("id", "me").with("kind", "weave#scripted")),
            }
        }
    }

    fn resolver() -> CommandResolver {
        let mut registry = HandlerRegistry::new();
        registry.register_handler("PersonalizedInfos", |_| Scripted).unwrap();
        CommandResolver::new(Arc::new(registry))
    }

    async fn run(attrs: CommandAttributes) -> ResponseEnvelope {
        let op = resolver()
            .resolve_verb("PersonalizedInfos", Verb::Get, attrs, RequestContext::new(1))
            .unwrap();
        Dispatcher::default().dispatch(op).await
    }

    #[tokio::test]
    async fn test_success_passes_payload_through() {
        let envelope = run(CommandAttributes::new()).await;
        let payload = envelope.payload().unwrap();
        assert_eq!(payload.id(), Some("me"));
        assert_eq!(payload.kind(), Some("weave#scripted"));
    }

    #[tokio::test]
    async fn test_missing_kind_is_synthesized() {
        let attrs = CommandAttributes::new().with("mode", "bare").with("id", "me");
        let envelope = run(attrs).await;
        let payload = envelope.payload().unwrap();
        assert_eq!(payload.kind(), Some("weave#personalizedInfo"));
        assert_eq!(payload.id(), Some("me"));
    }

    #[tokio::test]
    async fn test_missing_id_without_fallback_is_internal() {
        let envelope = run(CommandAttributes::new().with("mode", "bare")).await;
        assert_eq!(envelope.error_kind(), Some(ErrorKind::Internal));
    }

    #[tokio::test]
    async fn test_business_failure_keeps_message() {
        let envelope = run(CommandAttributes::new().with("mode", "business")).await;
        assert_eq!(
            envelope,
            ResponseEnvelope::business("locked", "resource locked")
        );
    }

    #[tokio::test]
    async fn test_internal_failures_are_generic() {
        for mode in ["internal", "panic"] {
            let envelope = run(CommandAttributes::new().with("mode", mode)).await;
            assert_eq!(envelope, ResponseEnvelope::internal());
            assert!(!envelope.message().unwrap().contains("fire"));
        }
    }
}
