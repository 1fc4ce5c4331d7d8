//! # Resource Names, Attributes & Representations
//!
//! The data that flows through the dispatch core is deliberately loose:
//! attributes and representations are JSON object maps, because their
//! contents belong to the individual handlers. Only two fields are part of
//! the contract, `id` and `kind`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::fmt::{self, Display};

use crate::error::RegistryError;

/// Field carrying a resource's identifier.
pub const ID_FIELD: &str = "id";
/// Field carrying a resource's kind discriminator (`"<namespace>#<resourceType>"`).
pub const KIND_FIELD: &str = "kind";

/// Name of a resource type, e.g. `PersonalizedInfos`.
///
/// Always a non-empty identifier: an ASCII letter followed by letters,
/// digits or underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResourceName(String);

impl ResourceName {
    pub fn new(name: impl Into<String>) -> Result<Self, RegistryError> {
        let name = name.into();
        if Self::is_valid(&name) {
            Ok(Self(name))
        } else {
            Err(RegistryError::InvalidName(name))
        }
    }

    pub fn is_valid(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derives the default kind discriminator for this resource.
    ///
    /// The first letter is lower-cased and a single trailing `s` is dropped:
    /// `PersonalizedInfos` in namespace `weave` becomes `weave#personalizedInfo`.
    pub fn kind(&self, namespace: &str) -> String {
        let mut chars = self.0.chars();
        let mut singular: String = match chars.next() {
            Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
            None => String::new(),
        };
        if singular.len() > 1 && singular.ends_with('s') {
            singular.pop();
        }
        format!("{namespace}#{singular}")
    }
}

impl Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ResourceName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ResourceName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ResourceName::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Operation-specific parameters supplied by the caller.
///
/// Never validated by the dispatch core; handlers interpret them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandAttributes(Map<String, Value>);

impl CommandAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy when assembling requests by hand.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for CommandAttributes {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A resource representation returned by a handler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(Map<String, Value>);

impl Resource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes any `Serialize` value that renders as a JSON object.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(serde::ser::Error::custom(format!(
                "resource must serialize to an object, got {other}"
            ))),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(Value::as_str)
    }

    pub fn kind(&self) -> Option<&str> {
        self.0.get(KIND_FIELD).and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Resource {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
