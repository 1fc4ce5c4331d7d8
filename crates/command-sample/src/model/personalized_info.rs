use crate::store::StoredRecord;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// Id of the record a request addresses when it names none.
pub const DEFAULT_ID: &str = "me";

/// Per-device personalization: where the device lives and what it is called.
///
/// Serializes with the wire field names (`lastUseTimeMs`). The `kind` is not
/// part of the record; the handler stamps it on the way out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedInfo {
    pub id: String,
    pub last_use_time_ms: u64,
    pub location: String,
    pub name: String,
}

impl PersonalizedInfo {
    /// A record with every field at its default.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            last_use_time_ms: 0,
            location: String::new(),
            name: String::new(),
        }
    }
}

/// Patch semantics: only the fields present change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersonalizedInfoPatch {
    pub last_use_time_ms: Option<u64>,
    pub location: Option<String>,
    pub name: Option<String>,
}

/// Update semantics: a full replacement, absent fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct PersonalizedInfoUpdate {
    pub last_use_time_ms: u64,
    pub location: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonalizedInfoChange {
    Patch(PersonalizedInfoPatch),
    Replace(PersonalizedInfoUpdate),
}

impl StoredRecord for PersonalizedInfo {
    type Change = PersonalizedInfoChange;
    type Error = Infallible;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, change: PersonalizedInfoChange) -> Result<(), Infallible> {
        match change {
            PersonalizedInfoChange::Patch(patch) => {
                if let Some(ms) = patch.last_use_time_ms {
                    self.last_use_time_ms = ms;
                }
                if let Some(location) = patch.location {
                    self.location = location;
                }
                if let Some(name) = patch.name {
                    self.name = name;
                }
            }
            PersonalizedInfoChange::Replace(update) => {
                self.last_use_time_ms = update.last_use_time_ms;
                self.location = update.location;
                self.name = update.name;
            }
        }
        Ok(())
    }
}
