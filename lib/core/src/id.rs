//! Strongly-typed identifiers for domain entities.
//!
//! Drink identifiers are assigned by the store as increasing integers and
//! never change once a drink exists.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Unique identifier for a drink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrinkId(i64);

impl DrinkId {
    /// Creates an ID from its raw integer value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// Returns the identifier following this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for DrinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DrinkId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.parse::<i64>().map_err(|e| ParseIdError {
            id_type: "DrinkId",
            reason: e.to_string(),
        })?;
        if value < 1 {
            return Err(ParseIdError {
                id_type: "DrinkId",
                reason: format!("{value} is not a positive integer"),
            });
        }
        Ok(Self(value))
    }
}

impl From<i64> for DrinkId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<DrinkId> for i64 {
    fn from(id: DrinkId) -> Self {
        id.0
    }
}
