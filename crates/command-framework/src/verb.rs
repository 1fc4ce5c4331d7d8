//! # Verbs & Capability Sets
//!
//! A [`Verb`] names one operation a resource handler can answer. Handlers
//! advertise the verbs they implement through a [`VerbSet`], which the
//! resolver checks before anything is invoked.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::ResolveError;

/// The operation kinds understood by the dispatch core.
///
/// Parsing from a string is case-sensitive: `"Get"` is a verb, `"get"` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verb {
    /// Read the current state of a resource.
    Get,
    /// Change only the fields present in the attributes.
    Patch,
    /// Replace the mutable fields wholesale; omitted fields revert to defaults.
    Update,
}

impl Verb {
    /// Every verb, in declaration order.
    pub const ALL: [Verb; 3] = [Verb::Get, Verb::Patch, Verb::Update];

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "Get",
            Verb::Patch => "Patch",
            Verb::Update => "Update",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Verb::Get => 1 << 0,
            Verb::Patch => 1 << 1,
            Verb::Update => 1 << 2,
        }
    }
}

impl Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str() == s)
            .ok_or_else(|| ResolveError::InvalidVerb(s.to_string()))
    }
}

/// The set of verbs a handler implements.
///
/// This is the explicit capability tag the resolver consults; it replaces any
/// attempt to infer support from the shape of the handler at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VerbSet(u8);

impl VerbSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Self::from_iter(Verb::ALL)
    }

    /// Returns a copy of the set with `verb` added.
    pub fn with(self, verb: Verb) -> Self {
        Self(self.0 | verb.bit())
    }

    pub fn contains(self, verb: Verb) -> bool {
        self.0 & verb.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Verb> {
        Verb::ALL.into_iter().filter(move |verb| self.contains(*verb))
    }
}

impl FromIterator<Verb> for VerbSet {
    fn from_iter<I: IntoIterator<Item = Verb>>(iter: I) -> Self {
        iter.into_iter().fold(VerbSet::empty(), VerbSet::with)
    }
}

impl<const N: usize> From<[Verb; N]> for VerbSet {
    fn from(verbs: [Verb; N]) -> Self {
        verbs.into_iter().collect()
    }
}

impl Display for VerbSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Verb::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
