//! # Identity Newtypes
//!
//! Newtype wrappers for the identifiers the engine passes around. These
//! prevent accidental confusion: a [`ScopeId`] cannot be passed where a
//! [`Path`] is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a reference scope, e.g. `variable` or `resource`.
///
/// Origins constrain which scopes they may resolve into; targets declare the
/// scope they belong to. The empty scope id is a wildcard on the origin side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(pub String);

impl ScopeId {
    /// Create a scope id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Whether this is the empty (wildcard) scope id.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Access the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScopeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A configuration unit: a directory of files in one language.
///
/// Local references resolve within one `Path`; path references cross into
/// another (e.g. a module call referring to the module's variables).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Path {
    /// Directory of the configuration unit.
    pub path: String,
    /// Language of the files in that directory.
    pub language_id: String,
}

impl Path {
    /// Create a path.
    pub fn new(path: impl Into<String>, language_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language_id: language_id.into(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.language_id)
    }
}
