//! Identifiers used throughout the cascade data model.
//!
//! All of these are thin newtypes over strings. The resolver never
//! interprets their contents; it only compares them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a level in a chain (e.g. `"company"`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelKey(String);

impl LevelKey {
    /// Create a level key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LevelKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Identifier of a non-level fetch parameter a level depends on
/// (e.g. `"include_out_of_stock"` on a catalog-items level).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamKey(String);

impl ParamKey {
    /// Create a param key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParamKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Value of a fetch parameter. Unset parameters read as the empty value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamValue(String);

impl ParamValue {
    /// Create a param value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::new(if value { "true" } else { "false" })
    }
}

/// Opaque identifier of a selectable option.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(String);

impl OptionId {
    /// Create an option identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OptionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for OptionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One selectable option: an opaque identifier plus a display label.
///
/// These are the only two fields the resolver needs; anything else a
/// backend returns per entity stays outside the resolver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Opaque identifier, used as the child level's ancestor value.
    pub id: OptionId,
    /// Human-readable label for rendering.
    pub label: String,
}

impl SelectOption {
    /// Create an option from an id and label.
    pub fn new(id: impl Into<OptionId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}
