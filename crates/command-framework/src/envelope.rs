//! # Response Envelope
//!
//! The single shape every dispatch ends in. The transport collaborator picks
//! the encoding; with JSON the two forms look like:
//!
//! ```text
//! {"success":true,"payload":{"id":"me","kind":"weave#personalizedInfo",...}}
//! {"success":false,"errorKind":"UnsupportedVerb","message":"..."}
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ErrorKind, ResolveError};
use crate::resource::Resource;

/// Message used for every infrastructure failure; details stay in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error";

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    Success {
        payload: Resource,
    },
    Failure {
        kind: ErrorKind,
        message: String,
        /// Handler-supplied code for business failures.
        reason: Option<String>,
    },
}

impl ResponseEnvelope {
    pub fn success(payload: Resource) -> Self {
        ResponseEnvelope::Success { payload }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        ResponseEnvelope::Failure {
            kind,
            message: message.into(),
            reason: None,
        }
    }

    pub fn business(reason: impl Into<String>, message: impl Into<String>) -> Self {
        ResponseEnvelope::Failure {
            kind: ErrorKind::Business,
            message: message.into(),
            reason: Some(reason.into()),
        }
    }

    pub fn internal() -> Self {
        Self::failure(ErrorKind::Internal, INTERNAL_ERROR_MESSAGE)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResponseEnvelope::Success { .. })
    }

    pub fn payload(&self) -> Option<&Resource> {
        match self {
            ResponseEnvelope::Success { payload } => Some(payload),
            ResponseEnvelope::Failure { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ResponseEnvelope::Success { .. } => None,
            ResponseEnvelope::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ResponseEnvelope::Success { .. } => None,
            ResponseEnvelope::Failure { message, .. } => Some(message),
        }
    }

    /// HTTP status a transport would answer with.
    pub fn http_status(&self) -> u16 {
        self.error_kind().map_or(200, ErrorKind::http_status)
    }
}

impl From<&ResolveError> for ResponseEnvelope {
    fn from(err: &ResolveError) -> Self {
        match err.kind() {
            ErrorKind::Internal => Self::internal(),
            kind => Self::failure(kind, err.to_string()),
        }
    }
}

impl From<ResolveError> for ResponseEnvelope {
    fn from(err: ResolveError) -> Self {
        Self::from(&err)
    }
}

// Flat wire form shared by both directions.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Wire {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl Serialize for ResponseEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self.clone() {
            ResponseEnvelope::Success { payload } => Wire {
                success: true,
                payload: Some(payload),
                error_kind: None,
                message: None,
                reason: None,
            },
            ResponseEnvelope::Failure {
                kind,
                message,
                reason,
            } => Wire {
                success: false,
                payload: None,
                error_kind: Some(kind),
                message: Some(message),
                reason,
            },
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ResponseEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = Wire::deserialize(deserializer)?;
        if wire.success {
            let payload = wire.payload.ok_or_else(|| D::Error::missing_field("payload"))?;
            Ok(ResponseEnvelope::Success { payload })
        } else {
            Ok(ResponseEnvelope::Failure {
                kind: wire.error_kind.ok_or_else(|| D::Error::missing_field("errorKind"))?,
                message: wire.message.unwrap_or_default(),
                reason: wire.reason,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verb::Verb;
    use serde_json::json;

    #[test]
    fn test_success_wire_shape() {
        let payload = Resource::new().with("id", "me").with("kind", "weave#personalizedInfo");
        let envelope = ResponseEnvelope::success(payload);
        assert_eq!(envelope.http_status(), 200);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"success": true, "payload": {"id": "me", "kind": "weave#personalizedInfo"}})
        );
    }

    #[test]
    fn test_failure_wire_shape() {
        let envelope: ResponseEnvelope = ResolveError::UnsupportedVerb {
            resource: "AuthorizedApps".into(),
            verb: Verb::Patch,
        }
        .into();
        assert_eq!(envelope.http_status(), 405);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "success": false,
                "errorKind": "UnsupportedVerb",
                "message": "Resource AuthorizedApps does not support Patch"
            })
        );

        let business = ResponseEnvelope::business("notFound", "no record 'x'");
        assert_eq!(
            serde_json::to_value(&business).unwrap(),
            json!({"success": false, "errorKind": "Business", "message": "no record 'x'", "reason": "notFound"})
        );
    }

    #[test]
    fn test_deserialize_accepts_wire_shape() {
        let envelope: ResponseEnvelope =
            serde_json::from_value(json!({"success": false, "errorKind": "Timeout", "message": "late"}))
                .unwrap();
        assert_eq!(envelope, ResponseEnvelope::failure(ErrorKind::Timeout, "late"));

        let missing: Result<ResponseEnvelope, _> = serde_json::from_value(json!({"success": true}));
        assert!(missing.is_err());
    }
}
