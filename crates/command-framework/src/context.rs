//! Request-scoped context handed to handler factories.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Everything a handler may know about the request it is serving.
///
/// A fresh context is built for every inbound request. Bootstrap settings
/// (bindings, storage endpoints, formats) ride along as an opaque value that
/// the core never inspects; handlers downcast it with [`RequestContext::settings`].
#[derive(Clone)]
pub struct RequestContext {
    request_id: u64,
    timeout: Option<Duration>,
    cancel: CancellationToken,
    settings: Option<Arc<dyn Any + Send + Sync>>,
}

impl RequestContext {
    pub fn new(request_id: u64) -> Self {
        Self {
            request_id,
            timeout: None,
            cancel: CancellationToken::new(),
            settings: None,
        }
    }

    /// Overrides the dispatcher's default time budget for this request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Uses an externally owned token; cancelling it abandons the request.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_settings(mut self, settings: Arc<dyn Any + Send + Sync>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Returns the bootstrap settings if they are of type `T`.
    pub fn settings<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.settings.as_deref()?.downcast_ref::<T>()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("timeout", &self.timeout)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("has_settings", &self.settings.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Bindings {
        port: u16,
    }

    #[test]
    fn test_settings_downcast() {
        let ctx = RequestContext::new(7).with_settings(Arc::new(Bindings { port: 8080 }));
        assert_eq!(ctx.request_id(), 7);
        assert_eq!(ctx.settings::<Bindings>(), Some(&Bindings { port: 8080 }));
        assert_eq!(ctx.settings::<String>(), None);
        assert_eq!(RequestContext::new(1).settings::<Bindings>(), None);
    }

    #[test]
    fn test_external_cancellation_is_shared() {
        let token = CancellationToken::new();
        let ctx = RequestContext::new(1)
            .with_timeout(Duration::from_millis(5))
            .with_cancellation(token.clone());
        assert!(!ctx.cancellation().is_cancelled());
        token.cancel();
        assert!(ctx.cancellation().is_cancelled());
        assert_eq!(ctx.timeout(), Some(Duration::from_millis(5)));
    }
}
