//! # Mock Handler & Testing Guide
//!
//! [`MockHandler`] is a scripted [`CommandHandler`] for exercising the
//! resolver, dispatcher and service without writing a real resource handler.
//! Queue expectations per verb, register the mock's [`factory`](MockHandler::factory)
//! in a registry, then [`verify`](MockHandler::verify) that every expectation
//! was consumed.
//!
//! | Feature | MockHandler | Real handler |
//! |---------|-------------|--------------|
//! | **State** | None (scripted replies) | Real storage round-trips |
//! | **Error injection** | `return_err`, `panic_with` | Requires specific state |
//! | **Latency injection** | `delayed` | Requires a slow collaborator |
//!
//! ```rust
//! use command_framework::mock::MockHandler;
//! use command_framework::{CommandRequest, CommandService, DispatchConfig, HandlerRegistry, Resource, Verb};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockHandler::new([Verb::Get]);
//!     mock.expect_get()
//!         .return_ok(Resource::new().with("id", "me").with("kind", "weave#personalizedInfo"));
//!
//!     let mut registry = HandlerRegistry::new();
//!     registry.register("PersonalizedInfos", mock.factory()).unwrap();
//!     let service = CommandService::new(registry, DispatchConfig::default());
//!
//!     let envelope = service.execute(CommandRequest::new("PersonalizedInfos", "Get")).await;
//!     assert!(envelope.is_success());
//!     mock.verify();
//! }
//! ```
//!
//! Unexpected calls panic inside the handler task, which the dispatcher turns
//! into an `Internal` envelope; `verify` then reports the leftover script.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::context::RequestContext;
use crate::error::HandlerError;
use crate::handler::{CommandHandler, HandlerFactory};
use crate::resource::{CommandAttributes, Resource};
use crate::verb::{Verb, VerbSet};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

enum Reply {
    Ok(Resource),
    Err(HandlerError),
    Panic(String),
}

struct Expectation {
    verb: Verb,
    delay: Option<Duration>,
    reply: Reply,
}

#[derive(Default)]
struct Script {
    expectations: Mutex<VecDeque<Expectation>>,
    received: Mutex<Vec<(Verb, CommandAttributes)>>,
    completed: AtomicUsize,
}

/// Scripted handler with expectation tracking.
#[derive(Clone)]
pub struct MockHandler {
    verbs: VerbSet,
    script: Arc<Script>,
}

impl MockHandler {
    /// Creates a mock advertising `verbs` and holding no expectations.
    pub fn new(verbs: impl Into<VerbSet>) -> Self {
        Self {
            verbs: verbs.into(),
            script: Arc::new(Script::default()),
        }
    }

    /// A factory that hands out request-bound views of this mock.
    pub fn factory(&self) -> HandlerFactory {
        let mock = self.clone();
        Arc::new(move |_ctx: &RequestContext| Box::new(mock.clone()) as Box<dyn CommandHandler>)
    }

    pub fn expect_get(&self) -> ExpectationBuilder {
        self.expect(Verb::Get)
    }

    pub fn expect_patch(&self) -> ExpectationBuilder {
        self.expect(Verb::Patch)
    }

    pub fn expect_update(&self) -> ExpectationBuilder {
        self.expect(Verb::Update)
    }

    pub fn expect(&self, verb: Verb) -> ExpectationBuilder {
        ExpectationBuilder {
            verb,
            delay: None,
            script: self.script.clone(),
        }
    }

    /// Calls whose reply was actually delivered (delays included).
    pub fn completed(&self) -> usize {
        self.script.completed.load(Ordering::SeqCst)
    }

    /// Verbs and attributes of every call received so far, in order.
    pub fn received(&self) -> Vec<(Verb, CommandAttributes)> {
        self.script.received.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.script.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }

    async fn answer(&self, verb: Verb, attributes: CommandAttributes) -> Result<Resource, HandlerError> {
        self.script.received.lock().unwrap().push((verb, attributes));
        let expectation = self.script.expectations.lock().unwrap().pop_front();

        let expectation = match expectation {
            Some(exp) if exp.verb == verb => exp,
            Some(exp) => panic!("Expected {} but received {}", exp.verb, verb),
            None => panic!("Unexpected {verb} call"),
        };

        if let Some(delay) = expectation.delay {
            tokio::time::sleep(delay).await;
        }
        self.script.completed.fetch_add(1, Ordering::SeqCst);

        match expectation.reply {
            Reply::Ok(resource) => Ok(resource),
            Reply::Err(e) => Err(e),
            Reply::Panic(message) => panic!("{message}"),
        }
    }
}

#[async_trait]
impl CommandHandler for MockHandler {
    fn verbs(&self) -> VerbSet {
        self.verbs
    }

    async fn get(&self, attributes: CommandAttributes) -> Result<Resource, HandlerError> {
        self.answer(Verb::Get, attributes).await
    }

    async fn patch(&self, attributes: CommandAttributes) -> Result<Resource, HandlerError> {
        self.answer(Verb::Patch, attributes).await
    }

    async fn update(&self, attributes: CommandAttributes) -> Result<Resource, HandlerError> {
        self.answer(Verb::Update, attributes).await
    }
}

/// Builder for one expected call.
pub struct ExpectationBuilder {
    verb: Verb,
    delay: Option<Duration>,
    script: Arc<Script>,
}

impl ExpectationBuilder {
    /// Holds the reply back for `delay` before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, resource: Resource) {
        self.push(Reply::Ok(resource));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: HandlerError) {
        self.push(Reply::Err(error));
    }

    /// Sets the expectation to panic, simulating a crashing handler.
    pub fn panic_with(self, message: impl Into<String>) {
        self.push(Reply::Panic(message.into()));
    }

    fn push(self, reply: Reply) {
        let mut exps = self.script.expectations.lock().unwrap();
        exps.push_back(Expectation {
            verb: self.verb,
            delay: self.delay,
            reply,
        });
    }
}
