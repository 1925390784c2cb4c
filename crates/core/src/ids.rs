#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Store-assigned identity of a node. Never reused, never changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(i64);

impl NodeId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Partition key of a forest. Nodes only ever interact with nodes that carry
/// the same key (or that, like them, carry none).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScopeKey(String);

impl ScopeKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, ScopeKeyError> {
        let value = value.into();
        validate_scope_key(&value)?;
        Ok(Self(value))
    }
}

impl std::fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ScopeKey {
    type Error = ScopeKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<ScopeKey> for String {
    fn from(value: ScopeKey) -> Self {
        value.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScopeKeyError {
    Empty,
    TooLong,
    ContainsControl,
}

impl ScopeKeyError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "scope key must not be empty",
            Self::TooLong => "scope key is too long",
            Self::ContainsControl => "scope key contains control characters",
        }
    }
}

impl std::fmt::Display for ScopeKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ScopeKeyError {}

fn validate_scope_key(value: &str) -> Result<(), ScopeKeyError> {
    if value.trim().is_empty() {
        return Err(ScopeKeyError::Empty);
    }
    if value.len() > 256 {
        return Err(ScopeKeyError::TooLong);
    }
    if value.chars().any(|c| c.is_control()) {
        return Err(ScopeKeyError::ContainsControl);
    }
    Ok(())
}
