//! Human-stable entity keys.
//!
//! Keys are the identifiers used in permission fingerprints and API paths,
//! distinct from the opaque UUIDs. They must match
//! `^[a-z0-9]+(_[a-z0-9]+)*$`: lowercase snake_case, no leading/trailing or
//! doubled underscores.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A validated lowercase snake_case key (e.g. `billing`, `invoice_line`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Key(String);

impl Key {
    /// Construct a key, rejecting anything outside the naming pattern.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if is_valid_key(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::invalid_format(format!(
                "'{value}' must match ^[a-z0-9]+(_[a-z0-9]+)*$"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid_key(value: &str) -> bool {
    // Equivalent to ^[a-z0-9]+(_[a-z0-9]+)*$ : every underscore-separated
    // segment must be a non-empty run of [a-z0-9].
    !value.is_empty()
        && value
            .split('_')
            .all(|seg| !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()))
}

impl core::fmt::Display for Key {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Key {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Key {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Key> for String {
    fn from(value: Key) -> Self {
        value.0
    }
}
