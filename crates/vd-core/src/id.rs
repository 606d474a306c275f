//! Unique identifier type shared by every controller and record kind

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Error type for invalid unique ids
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UniqueIdError {
    #[error("unique id cannot be empty")]
    Empty,

    #[error("unique id contains whitespace")]
    Whitespace,
}

/// An opaque unique identifier for a controller, action, condition, or
/// other persisted record.
///
/// Ids are uuid-formatted strings. An id is assumed unique across every
/// record kind; the controller resolver relies on that invariant but does
/// not enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueId(String);

impl UniqueId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parse an id from an existing string
    pub fn parse(s: impl Into<String>) -> Result<Self, UniqueIdError> {
        let s = s.into();
        if s.is_empty() {
            return Err(UniqueIdError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(UniqueIdError::Whitespace);
        }
        Ok(Self(s))
    }

    /// The short form of the id: the first hyphen-separated segment.
    ///
    /// Used in message trailers and per-entity logger names.
    pub fn short(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    /// The full id string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UniqueId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UniqueId {
    type Err = UniqueIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_short() {
        let id = UniqueId::new();
        assert!(!id.as_str().is_empty());
        assert_eq!(id.short(), id.as_str().split('-').next().unwrap());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(UniqueId::parse(""), Err(UniqueIdError::Empty));
        assert_eq!(UniqueId::parse("a b"), Err(UniqueIdError::Whitespace));
    }

    #[test]
    fn test_short_of_uuid() {
        let id = UniqueId::parse("959019d1-c1fa-41fe-a554-7be3366a9c5b").unwrap();
        assert_eq!(id.short(), "959019d1");
    }

    #[test]
    fn test_short_without_hyphen() {
        let id = UniqueId::parse("plainid").unwrap();
        assert_eq!(id.short(), "plainid");
    }
}
