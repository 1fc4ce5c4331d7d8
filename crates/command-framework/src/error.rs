//! # Framework Errors
//!
//! This module defines the error types used throughout the dispatch core.
//! Each stage has its own enum so callers can tell *where* something went wrong:
//!
//! - [`RegistryError`]: start-up registration conflicts (fatal at boot).
//! - [`ResolveError`]: detected before a handler is invoked.
//! - [`HandlerError`]: reported by a handler while executing a verb.
//!
//! [`ErrorKind`] is the flattened form that travels inside a failure envelope.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::verb::Verb;

/// Errors raised while populating the handler registry.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Resource already registered: {0}")]
    DuplicateResource(String),
    #[error("Invalid resource name: {0:?}")]
    InvalidName(String),
}

/// Errors detected while turning a request into an executable operation.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Unknown resource: {0}")]
    UnknownResource(String),
    #[error("Invalid verb: {0:?}")]
    InvalidVerb(String),
    #[error("Resource {resource} does not support {verb}")]
    UnsupportedVerb { resource: String, verb: Verb },
    #[error("Handler for {0} panicked while being built")]
    HandlerPanicked(String),
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::UnknownResource(_) => ErrorKind::UnknownResource,
            ResolveError::InvalidVerb(_) => ErrorKind::InvalidVerb,
            ResolveError::UnsupportedVerb { .. } => ErrorKind::UnsupportedVerb,
            ResolveError::HandlerPanicked(_) => ErrorKind::Internal,
        }
    }
}

/// Errors a handler reports from a verb operation.
///
/// # Business vs. infrastructure
/// `Business` failures come from the handler's own rules (validation failed,
/// record missing, resource locked) and reach the caller with the handler's
/// message. Everything else is infrastructure: the caller only ever sees a
/// generic message, the detail goes to the log.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("{code}: {message}")]
    Business { code: String, message: String },
    #[error("Internal handler failure: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Verb not implemented by handler: {0}")]
    NotImplemented(Verb),
}

impl HandlerError {
    /// Shorthand for a handler-reported business failure.
    pub fn business(code: impl Into<String>, message: impl Into<String>) -> Self {
        HandlerError::Business {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        HandlerError::Internal(source.into())
    }

    pub fn is_business(&self) -> bool {
        matches!(self, HandlerError::Business { .. })
    }
}

/// The error discriminator carried by a failure envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    UnknownResource,
    InvalidVerb,
    UnsupportedVerb,
    Business,
    Internal,
    Timeout,
}

impl ErrorKind {
    /// The HTTP status a transport would typically answer with.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::UnknownResource => 404,
            ErrorKind::InvalidVerb => 400,
            ErrorKind::UnsupportedVerb => 405,
            ErrorKind::Business => 422,
            ErrorKind::Internal => 500,
            ErrorKind::Timeout => 504,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::UnknownResource => "UnknownResource",
            ErrorKind::InvalidVerb => "InvalidVerb",
            ErrorKind::UnsupportedVerb => "UnsupportedVerb",
            ErrorKind::Business => "Business",
            ErrorKind::Internal => "Internal",
            ErrorKind::Timeout => "Timeout",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
