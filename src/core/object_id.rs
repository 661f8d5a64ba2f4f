//! Object identification - the 24-digit hex key of every pbxproj record.
//!
//! Ids are opaque. They are normalized to uppercase on parse so that a
//! reference written in lowercase by a third-party generator still resolves.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Identifier of a record in a project document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjectId(String);

/// Error parsing an object id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectIdError {
    #[error("object id `{0}` must be {len} hex digits", len = ObjectId::LEN)]
    BadLength(String),

    #[error("object id `{0}` contains a non-hex character")]
    NotHex(String),
}

impl ObjectId {
    /// Number of hex digits in an id.
    pub const LEN: usize = 24;

    /// Parse an id, returning `None` for anything that is not 24 hex digits.
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != Self::LEN {
            return Err(ObjectIdError::BadLength(s.to_string()));
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ObjectIdError::NotHex(s.to_string()));
        }
        Ok(ObjectId(s.to_ascii_uppercase()))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
