//! # AuthorizedApps Resource
//!
//! Read-only: `Get` lists every app provisioned from the config file. `Patch`
//! and `Update` are not offered, so the resolver refuses them with
//! `UnsupportedVerb` before this handler is ever invoked.

use async_trait::async_trait;
use command_framework::{
    CommandAttributes, CommandHandler, HandlerError, RequestContext, Resource, Verb, VerbSet,
};

use crate::config::Config;
use crate::model::{AuthorizedApp, AuthorizedAppsListResponse};
use crate::store::StoreClient;

pub const RESOURCE_NAME: &str = "AuthorizedApps";
/// The list is a singleton addressed by this id.
pub const LIST_ID: &str = "authorizedApps";
pub const KIND_TYPE: &str = "authorizedAppsListResponse";

pub struct AuthorizedAppsHandler {
    store: StoreClient<AuthorizedApp>,
    kind: String,
}

impl AuthorizedAppsHandler {
    pub fn new(store: StoreClient<AuthorizedApp>, namespace: &str) -> Self {
        Self {
            store,
            kind: format!("{namespace}#{KIND_TYPE}"),
        }
    }

    pub fn for_request(store: StoreClient<AuthorizedApp>, ctx: &RequestContext) -> Self {
        let namespace = ctx
            .settings::<Config>()
            .map(|config| config.dispatch.namespace.as_str())
            .unwrap_or(command_framework::dispatcher::DEFAULT_NAMESPACE);
        Self::new(store, namespace)
    }
}

#[async_trait]
impl CommandHandler for AuthorizedAppsHandler {
    fn verbs(&self) -> VerbSet {
        VerbSet::from([Verb::Get])
    }

    async fn get(&self, _attributes: CommandAttributes) -> Result<Resource, HandlerError> {
        let authorized_apps = self.store.list().await.map_err(HandlerError::internal)?;
        let response = AuthorizedAppsListResponse {
            id: LIST_ID.to_string(),
            kind: self.kind.clone(),
            authorized_apps,
        };
        Resource::from_serialize(&response).map_err(HandlerError::internal)
    }
}
