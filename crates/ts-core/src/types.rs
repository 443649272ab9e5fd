//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty or contained only whitespace.
    #[error("{field} cannot be blank")]
    Blank { field: &'static str },

    /// Unknown item field name.
    #[error("invalid item field: {value}")]
    InvalidItemField { value: String },
}

/// Returns true if the value has at least one non-whitespace character.
fn has_content(value: &str) -> bool {
    value.chars().any(|c| !c.is_whitespace())
}

/// Generates a validated name newtype with common trait implementations.
macro_rules! define_name {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new name after validation.
            ///
            /// The value is kept exactly as given; only whitespace-only
            /// values are rejected.
            pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
                let name = name.into();
                if !has_content(&name) {
                    return Err(ValidationError::Blank { field: $field_name });
                }
                Ok(Self(name))
            }

            /// Returns the name as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(name: $name) -> Self {
                name.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_name!(
    /// A validated task name.
    ///
    /// Task names must contain at least one non-whitespace character.
    TaskName, "task"
);

define_name!(
    /// A validated project name.
    ///
    /// Project names must contain at least one non-whitespace character.
    ProjectName, "project"
);

/// Row identifier assigned by the ledger on insert.
///
/// Ids are monotonic in insertion order, so the greatest id is the most
/// recently created entry regardless of its clock-in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(i64);

impl EntryId {
    /// Wraps a raw row id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw row id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The entry fields that time can be totalled by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemField {
    Task,
    Project,
}

impl ItemField {
    /// Column name in the `timesheet` table.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Project => "project",
        }
    }
}

impl fmt::Display for ItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ItemField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" => Ok(Self::Task),
            "project" => Ok(Self::Project),
            _ => Err(ValidationError::InvalidItemField {
                value: s.to_string(),
            }),
        }
    }
}
