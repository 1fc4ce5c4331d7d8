//! # System Lifecycle
//!
//! [`CommandSystem`] is the conductor of the sample: it starts one store actor
//! per record type, seeds them, registers the resource handlers and freezes
//! the registry into a [`CommandService`].
//!
//! ## Startup
//!
//! 1. **Stores**: a [`StoreActor`] for `PersonalizedInfo` seeded with the
//!    default `"me"` record, and one for `AuthorizedApp` seeded from config.
//! 2. **Registry**: each handler factory captures a clone of its store client.
//! 3. **Service**: the registry is frozen; every request from here on sees the
//!    same set of resources.
//!
//! ## Shutdown
//!
//! Dropping the service drops the factories and with them the last store
//! clients, so each actor's `recv()` returns `None` and its loop ends.
//! [`shutdown`](CommandSystem::shutdown) then awaits the actor tasks.
//! Service clones handed out earlier keep the stores alive; drop them first.

use command_framework::{
    CommandRequest, CommandService, HandlerRegistry, RegistryError, ResponseEnvelope,
};
use std::any::Any;
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

use crate::authorized_apps::{self, AuthorizedAppsHandler};
use crate::config::Config;
use crate::model::{AuthorizedApp, PersonalizedInfo, DEFAULT_ID};
use crate::personalized_infos::{self, PersonalizedInfosHandler};
use crate::store::{StoreActor, StoreClient};

/// Pending requests each store queues before senders wait.
const STORE_BUFFER: usize = 32;

pub struct CommandSystem {
    service: CommandService,
    /// Direct access to the personalization records, bypassing dispatch.
    pub personalized_infos: StoreClient<PersonalizedInfo>,
    pub authorized_apps: StoreClient<AuthorizedApp>,
    config: Arc<Config>,
    handles: Vec<JoinHandle<()>>,
}

impl CommandSystem {
    /// Starts the stores and builds the service. Must run inside a Tokio runtime.
    pub fn new(config: Config) -> Result<Self, RegistryError> {
        let (info_actor, info_store) = StoreActor::<PersonalizedInfo>::new(STORE_BUFFER);
        let info_handle = tokio::spawn(
            info_actor
                .with_records([PersonalizedInfo::new(DEFAULT_ID)])
                .run(),
        );

        let (apps_actor, apps_store) = StoreActor::<AuthorizedApp>::new(STORE_BUFFER);
        let apps_handle = tokio::spawn(
            apps_actor
                .with_records(config.authorized_apps.iter().cloned())
                .run(),
        );

        let mut registry = HandlerRegistry::new();
        let store = info_store.clone();
        registry.register_handler(personalized_infos::RESOURCE_NAME, move |ctx| {
            PersonalizedInfosHandler::for_request(store.clone(), ctx)
        })?;
        let store = apps_store.clone();
        registry.register_handler(authorized_apps::RESOURCE_NAME, move |ctx| {
            AuthorizedAppsHandler::for_request(store.clone(), ctx)
        })?;

        let service = CommandService::new(registry, config.dispatch_config());
        info!(
            hostname = %config.server.hostname,
            port = config.server.port,
            https = config.server.https,
            "Command system started"
        );

        Ok(Self {
            service,
            personalized_infos: info_store,
            authorized_apps: apps_store,
            config: Arc::new(config),
            handles: vec![info_handle, apps_handle],
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> &CommandService {
        &self.service
    }

    /// Executes `request`, attaching the bootstrap config as its settings
    /// unless the request already carries some.
    pub async fn execute(&self, mut request: CommandRequest) -> ResponseEnvelope {
        if request.settings.is_none() {
            let settings: Arc<dyn Any + Send + Sync> = self.config.clone();
            request.settings = Some(settings);
        }
        self.service.execute(request).await
    }

    /// Stops the stores and waits for their tasks to finish.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        info!("Shutting down command system");
        drop(self.service);
        drop(self.personalized_infos);
        drop(self.authorized_apps);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Store task failed");
                return Err(e);
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
