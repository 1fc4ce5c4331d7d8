//! # PersonalizedInfos Resource
//!
//! Serves `Get`, `Patch` and `Update` on [`PersonalizedInfo`] records.
//!
//! - Requests address a record through the `id` attribute, `"me"` when absent.
//! - An echoed `kind` is accepted as long as it names this resource.
//! - `Patch` changes only the fields it carries.
//! - `Update` replaces the record; fields it leaves out go back to their defaults.
//! - Unknown or mistyped attributes fail with the business code `invalidAttributes`.
//! - A missing record fails with `notFound`.
//!
//! Store trouble (closed channel, dropped reply) is an internal failure and
//! never reaches the caller in detail.

use async_trait::async_trait;
use command_framework::resource::{ID_FIELD, KIND_FIELD};
use command_framework::{
    CommandAttributes, CommandHandler, HandlerError, RequestContext, Resource, Verb, VerbSet,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::model::{
    PersonalizedInfo, PersonalizedInfoChange, PersonalizedInfoPatch, PersonalizedInfoUpdate,
    DEFAULT_ID,
};
use crate::store::{StoreClient, StoreError};

/// Name the resource is registered under.
pub const RESOURCE_NAME: &str = "PersonalizedInfos";
/// Type part of the `kind` field.
pub const KIND_TYPE: &str = "personalizedInfo";

/// Business code for attributes that do not fit the record.
pub const INVALID_ATTRIBUTES: &str = "invalidAttributes";
/// Business code for an id with no record behind it.
pub const NOT_FOUND: &str = "notFound";

/// Handler bound to one request.
pub struct PersonalizedInfosHandler {
    store: StoreClient<PersonalizedInfo>,
    kind: String,
}

impl PersonalizedInfosHandler {
    pub fn new(store: StoreClient<PersonalizedInfo>, namespace: &str) -> Self {
        Self {
            store,
            kind: format!("{namespace}#{KIND_TYPE}"),
        }
    }

    /// Builds a handler for `ctx`, taking the namespace from the bootstrap
    /// [`Config`] when one travels with the request.
    pub fn for_request(store: StoreClient<PersonalizedInfo>, ctx: &RequestContext) -> Self {
        let namespace = ctx
            .settings::<Config>()
            .map(|config| config.dispatch.namespace.as_str())
            .unwrap_or(command_framework::dispatcher::DEFAULT_NAMESPACE);
        Self::new(store, namespace)
    }

    fn to_resource(&self, record: &PersonalizedInfo) -> Result<Resource, HandlerError> {
        let resource = Resource::from_serialize(record).map_err(HandlerError::internal)?;
        Ok(resource.with(KIND_FIELD, self.kind.clone()))
    }

    /// Separates the addressing `id` and the echoed `kind` from the record fields.
    fn split_id(
        &self,
        attributes: CommandAttributes,
    ) -> Result<(String, serde_json::Map<String, Value>), HandlerError> {
        let mut fields = attributes.into_inner();
        let id = match fields.remove(ID_FIELD) {
            None | Some(Value::Null) => DEFAULT_ID.to_string(),
            Some(Value::String(id)) if !id.is_empty() => id,
            Some(other) => {
                return Err(HandlerError::business(
                    INVALID_ATTRIBUTES,
                    format!("id must be a non-empty string, got {other}"),
                ))
            }
        };
        match fields.remove(KIND_FIELD) {
            None | Some(Value::Null) => {}
            Some(Value::String(kind)) if kind == self.kind => {}
            Some(other) => {
                return Err(HandlerError::business(
                    INVALID_ATTRIBUTES,
                    format!("kind must be {:?}, got {other}", self.kind),
                ))
            }
        }
        Ok((id, fields))
    }

    async fn change(
        &self,
        attributes: CommandAttributes,
        build: impl FnOnce(Value) -> Result<PersonalizedInfoChange, serde_json::Error>,
    ) -> Result<Resource, HandlerError> {
        let (id, fields) = self.split_id(attributes)?;
        let change = build(Value::Object(fields))
            .map_err(|e| HandlerError::business(INVALID_ATTRIBUTES, e.to_string()))?;
        debug!(%id, ?change, "Applying change");

        let record = self.store.apply(id, change).await.map_err(store_error)?;
        self.to_resource(&record)
    }
}

#[async_trait]
impl CommandHandler for PersonalizedInfosHandler {
    fn verbs(&self) -> VerbSet {
        VerbSet::from([Verb::Get, Verb::Patch, Verb::Update])
    }

    async fn get(&self, attributes: CommandAttributes) -> Result<Resource, HandlerError> {
        let (id, _) = self.split_id(attributes)?;
        match self.store.get(id.clone()).await.map_err(store_error)? {
            Some(record) => self.to_resource(&record),
            None => Err(not_found(&id)),
        }
    }

    async fn patch(&self, attributes: CommandAttributes) -> Result<Resource, HandlerError> {
        self.change(attributes, |fields| {
            parse::<PersonalizedInfoPatch>(fields).map(PersonalizedInfoChange::Patch)
        })
        .await
    }

    async fn update(&self, attributes: CommandAttributes) -> Result<Resource, HandlerError> {
        self.change(attributes, |fields| {
            parse::<PersonalizedInfoUpdate>(fields).map(PersonalizedInfoChange::Replace)
        })
        .await
    }
}

fn parse<T: DeserializeOwned>(fields: Value) -> Result<T, serde_json::Error> {
    serde_json::from_value(fields)
}

fn not_found(id: &str) -> HandlerError {
    HandlerError::business(NOT_FOUND, format!("No personalized info with id {id}"))
}

fn store_error(e: StoreError) -> HandlerError {
    match e {
        StoreError::NotFound(id) => not_found(&id),
        other => HandlerError::internal(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreActor;
    use serde_json::json;
    use std::sync::Arc;

    async fn handler_with(records: Vec<PersonalizedInfo>) -> PersonalizedInfosHandler {
        let (actor, client) = StoreActor::new(8);
        tokio::spawn(actor.with_records(records).run());
        PersonalizedInfosHandler::new(client, "weave")
    }

    #[tokio::test]
    async fn test_get_defaults_to_me() {
        let handler = handler_with(vec![PersonalizedInfo::new("me")]).await;
        let resource = handler.get(CommandAttributes::new()).await.unwrap();
        assert_eq!(
            serde_json::to_value(&resource).unwrap(),
            json!({
                "id": "me",
                "kind": "weave#personalizedInfo",
                "lastUseTimeMs": 0,
                "location": "",
                "name": ""
            })
        );
    }

    #[tokio::test]
    async fn test_get_missing_record_is_not_found() {
        let handler = handler_with(vec![]).await;
        let err = handler
            .get(CommandAttributes::new().with("id", "garage"))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Business { ref code, .. } if code == NOT_FOUND));
    }

    #[tokio::test]
    async fn test_non_string_id_is_invalid() {
        let handler = handler_with(vec![PersonalizedInfo::new("me")]).await;
        let err = handler
            .patch(CommandAttributes::new().with("id", 42))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Business { ref code, .. } if code == INVALID_ATTRIBUTES));
    }

    #[tokio::test]
    async fn test_unknown_field_is_invalid() {
        let handler = handler_with(vec![PersonalizedInfo::new("me")]).await;
        let err = handler
            .update(CommandAttributes::new().with("colour", "red"))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Business { ref code, ref message }
            if code == INVALID_ATTRIBUTES && message.contains("colour")));
    }

    #[tokio::test]
    async fn test_echoed_representation_is_accepted() {
        let handler = handler_with(vec![PersonalizedInfo::new("me")]).await;
        let mut fetched = handler.get(CommandAttributes::new()).await.unwrap();
        fetched.insert("name", "Desk lamp");
        let attributes: CommandAttributes =
            serde_json::from_value(serde_json::to_value(&fetched).unwrap()).unwrap();

        let patched = handler.patch(attributes.clone()).await.unwrap();
        assert_eq!(patched.get("name"), Some(&json!("Desk lamp")));
        let updated = handler.update(attributes).await.unwrap();
        assert_eq!(updated.kind(), Some("weave#personalizedInfo"));
    }

    #[tokio::test]
    async fn test_foreign_kind_is_invalid() {
        let handler = handler_with(vec![PersonalizedInfo::new("me")]).await;
        for kind in [json!("weave#device"), json!(7)] {
            let err = handler
                .patch(CommandAttributes::new().with("kind", kind).with("name", "x"))
                .await
                .unwrap_err();
            assert!(matches!(err, HandlerError::Business { ref code, .. } if code == INVALID_ATTRIBUTES));
        }
    }

    #[test]
    fn test_namespace_comes_from_settings() {
        let (client, _requests) = crate::store::mock::create_mock_store::<PersonalizedInfo>(1);
        let mut config = Config::default();
        config.dispatch.namespace = "acme".to_string();
        let ctx = RequestContext::new(1).with_settings(Arc::new(config));

        let handler = PersonalizedInfosHandler::for_request(client.clone(), &ctx);
        assert_eq!(handler.kind, "acme#personalizedInfo");

        let handler = PersonalizedInfosHandler::for_request(client, &RequestContext::new(2));
        assert_eq!(handler.kind, "weave#personalizedInfo");
    }
}
