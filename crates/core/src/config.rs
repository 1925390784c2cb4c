#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Column names a store must not hand to the tree configuration.
pub const RESERVED_COLUMNS: &[&str] = &["id", "attributes_json"];

/// A validated SQL-safe identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnName(String);

impl ColumnName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn try_new(value: impl Into<String>) -> Result<Self, ConfigError> {
        let value = value.into();
        validate_identifier(&value)?;
        Ok(Self(value))
    }
}

impl TryFrom<String> for ColumnName {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<ColumnName> for String {
    fn from(value: ColumnName) -> Self {
        value.0
    }
}

impl std::fmt::Display for ColumnName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyIdentifier,
    IdentifierTooLong(String),
    InvalidIdentifier(String),
    ReservedColumn(String),
    DuplicateColumn(String),
    Parse(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyIdentifier => write!(f, "identifier must not be empty"),
            Self::IdentifierTooLong(name) => write!(f, "identifier is too long: {name}"),
            Self::InvalidIdentifier(name) => write!(f, "invalid identifier: {name}"),
            Self::ReservedColumn(name) => write!(f, "column name is reserved: {name}"),
            Self::DuplicateColumn(name) => write!(f, "column configured twice: {name}"),
            Self::Parse(err) => write!(f, "config parse: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

fn validate_identifier(value: &str) -> Result<(), ConfigError> {
    let Some(first) = value.chars().next() else {
        return Err(ConfigError::EmptyIdentifier);
    };
    if value.len() > 64 {
        return Err(ConfigError::IdentifierTooLong(value.to_string()));
    }
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(ConfigError::InvalidIdentifier(value.to_string()));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConfigError::InvalidIdentifier(value.to_string()));
    }
    Ok(())
}

/// Where the tree lives inside the record store. Resolved once at setup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub table: ColumnName,
    pub parent_column: ColumnName,
    pub left_column: ColumnName,
    pub right_column: ColumnName,
    /// `None` makes the whole table a single forest.
    pub scope_column: Option<ColumnName>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            table: ColumnName("nodes".to_string()),
            parent_column: ColumnName("parent_id".to_string()),
            left_column: ColumnName("lft".to_string()),
            right_column: ColumnName("rgt".to_string()),
            scope_column: Some(ColumnName("scope".to_string())),
        }
    }
}

impl TreeConfig {
    pub fn unscoped() -> Self {
        Self {
            scope_column: None,
            ..Self::default()
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn is_scoped(&self) -> bool {
        self.scope_column.is_some()
    }

    /// Rejects reserved or repeated column names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen: Vec<&str> = Vec::with_capacity(4);
        let columns = [
            Some(&self.parent_column),
            Some(&self.left_column),
            Some(&self.right_column),
            self.scope_column.as_ref(),
        ];
        for column in columns.into_iter().flatten() {
            let name = column.as_str();
            if RESERVED_COLUMNS
                .iter()
                .any(|reserved| reserved.eq_ignore_ascii_case(name))
            {
                return Err(ConfigError::ReservedColumn(name.to_string()));
            }
            if seen.iter().any(|other| other.eq_ignore_ascii_case(name)) {
                return Err(ConfigError::DuplicateColumn(name.to_string()));
            }
            seen.push(name);
        }
        Ok(())
    }

    /// Names an attribute patch may never carry: the configured structural
    /// columns plus their logical aliases.
    pub fn protected_fields(&self) -> [&str; 6] {
        [
            self.left_column.as_str(),
            self.right_column.as_str(),
            self.parent_column.as_str(),
            "left",
            "right",
            "parent",
        ]
    }
}
