//! # Command Service
//!
//! The entry point a transport talks to. It owns the frozen registry, the
//! resolver and the dispatcher, and turns each inbound [`CommandRequest`]
//! into exactly one [`ResponseEnvelope`]. Resolution errors are converted
//! here, so nothing but an envelope ever leaves the core.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::context::RequestContext;
use crate::dispatcher::{DispatchConfig, Dispatcher};
use crate::envelope::ResponseEnvelope;
use crate::registry::HandlerRegistry;
use crate::resolver::CommandResolver;
use crate::resource::CommandAttributes;

/// One inbound command as handed over by the transport.
#[derive(Clone, Default)]
pub struct CommandRequest {
    pub resource: String,
    pub verb: String,
    pub attributes: CommandAttributes,
    /// Per-request budget; the dispatcher default applies when `None`.
    pub timeout: Option<Duration>,
    /// Externally owned cancellation signal.
    pub cancel: Option<CancellationToken>,
    /// Opaque bootstrap settings forwarded to the handler factory.
    pub settings: Option<Arc<dyn Any + Send + Sync>>,
}

impl CommandRequest {
    pub fn new(resource: impl Into<String>, verb: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            verb: verb.into(),
            ..Self::default()
        }
    }

    pub fn with_attributes(mut self, attributes: CommandAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_settings(mut self, settings: Arc<dyn Any + Send + Sync>) -> Self {
        self.settings = Some(settings);
        self
    }
}

impl std::fmt::Debug for CommandRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRequest")
            .field("resource", &self.resource)
            .field("verb", &self.verb)
            .field("attributes", &self.attributes)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

struct Inner {
    resolver: CommandResolver,
    dispatcher: Dispatcher,
    next_request_id: AtomicU64,
}

/// Cheap-to-clone handle over resolver + dispatcher.
#[derive(Clone)]
pub struct CommandService {
    inner: Arc<Inner>,
}

impl CommandService {
    /// Freezes `registry` and builds the service around it.
    pub fn new(registry: HandlerRegistry, config: DispatchConfig) -> Self {
        info!(
            resources = ?registry.names(),
            namespace = %config.namespace,
            timeout = ?config.default_timeout,
            "Command service ready"
        );
        Self {
            inner: Arc::new(Inner {
                resolver: CommandResolver::new(Arc::new(registry)),
                dispatcher: Dispatcher::new(config),
                next_request_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn resolver(&self) -> &CommandResolver {
        &self.inner.resolver
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    /// Resolves and dispatches one request.
    #[instrument(skip(self, request), fields(resource = %request.resource, verb = %request.verb))]
    pub async fn execute(&self, request: CommandRequest) -> ResponseEnvelope {
        let request_id = self.inner.next_request_id.fetch_add(1, Ordering::SeqCst);

        let mut context = RequestContext::new(request_id);
        if let Some(timeout) = request.timeout {
            context = context.with_timeout(timeout);
        }
        if let Some(cancel) = request.cancel {
            context = context.with_cancellation(cancel);
        }
        if let Some(settings) = request.settings {
            context = context.with_settings(settings);
        }

        match self.inner.resolver.resolve(
            &request.resource,
            &request.verb,
            request.attributes,
            context,
        ) {
            Ok(op) => self.inner.dispatcher.dispatch(op).await,
            Err(e) => {
                warn!(request_id, error = %e, "Resolution failed");
                ResponseEnvelope::from(e)
            }
        }
    }
}

impl std::fmt::Debug for CommandService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandService")
            .field("registry", self.inner.resolver.registry())
            .field("dispatcher", &self.inner.dispatcher)
            .finish()
    }
}
