//! # Handler Registry
//!
//! Maps each [`ResourceName`] to the [`HandlerFactory`] that builds its handler.
//!
//! The registry has two phases. During start-up it is owned mutably and
//! filled with [`HandlerRegistry::register`]. Once the service is built it is
//! moved behind an `Arc` and never mutated again, so request tasks read it
//! concurrently without any lock.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::context::RequestContext;
use crate::error::{RegistryError, ResolveError};
use crate::handler::{factory, CommandHandler, HandlerFactory};
use crate::resource::ResourceName;

#[derive(Default)]
pub struct HandlerRegistry {
    entries: HashMap<ResourceName, HandlerFactory>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `name` with a handler factory.
    ///
    /// A second registration under the same name is rejected and leaves the
    /// first one in place.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: HandlerFactory,
    ) -> Result<(), RegistryError> {
        let name = ResourceName::new(name)?;
        if self.entries.contains_key(&name) {
            warn!(resource = %name, "Duplicate registration rejected");
            return Err(RegistryError::DuplicateResource(name.to_string()));
        }
        debug!(resource = %name, "Registered");
        self.entries.insert(name, factory);
        Ok(())
    }

    /// Convenience wrapper over [`register`](Self::register) for closures
    /// that return a concrete handler type.
    pub fn register_handler<H, F>(&mut self, name: impl Into<String>, build: F) -> Result<(), RegistryError>
    where
        H: CommandHandler,
        F: Fn(&RequestContext) -> H + Send + Sync + 'static,
    {
        self.register(name, factory(build))
    }

    /// Finds the registered name and factory for `name`.
    pub fn lookup(&self, name: &str) -> Result<(&ResourceName, &HandlerFactory), ResolveError> {
        self.entries
            .get_key_value(name)
            .ok_or_else(|| ResolveError::UnknownResource(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&ResourceName> {
        let mut names: Vec<_> = self.entries.keys().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("resources", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::resource::{CommandAttributes, Resource};
    use crate::verb::{Verb, VerbSet};
    use async_trait::async_trait;

    struct Tagged(&'static str);

    #[async_trait]
    impl CommandHandler for Tagged {
        fn verbs(&self) -> VerbSet {
            VerbSet::from([Verb::Get])
        }

        async fn get(&self, _attributes: CommandAttributes) -> Result<Resource, HandlerError> {
            Ok(Resource::new().with("id", self.0).with("kind", "test#tagged"))
        }
    }

    #[tokio::test]
    async fn test_duplicate_registration_keeps_first() {
        let mut registry = HandlerRegistry::new();
        registry
            .register_handler("PersonalizedInfos", |_| Tagged("first"))
            .unwrap();

        let err = registry
            .register_handler("PersonalizedInfos", |_| Tagged("second"))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateResource("PersonalizedInfos".into())
        );
        assert_eq!(registry.len(), 1);

        let (_, build) = registry.lookup("PersonalizedInfos").unwrap();
        let handler = build(&RequestContext::new(1));
        let resource = handler.get(CommandAttributes::new()).await.unwrap();
        assert_eq!(resource.id(), Some("first"));
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        let err = registry.lookup("Devices").err().unwrap();
        assert_eq!(err, ResolveError::UnknownResource("Devices".into()));
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let mut registry = HandlerRegistry::new();
        let err = registry.register_handler("", |_| Tagged("x")).unwrap_err();
        assert_eq!(err, RegistryError::InvalidName(String::new()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_names_are_sorted() {
        let mut registry = HandlerRegistry::new();
        registry.register_handler("PersonalizedInfos", |_| Tagged("a")).unwrap();
        registry.register_handler("AuthorizedApps", |_| Tagged("b")).unwrap();
        let names: Vec<&str> = registry.names().into_iter().map(ResourceName::as_str).collect();
        assert_eq!(names, vec!["AuthorizedApps", "PersonalizedInfos"]);
        assert!(registry.contains("AuthorizedApps"));
    }
}
