//! Pack identifiers

use crate::resource::error::{ResourceError, Result};
use rand::{RngExt, rng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated identifiers
pub const GENERATED_LEN: usize = 8;

/// Longest identifier accepted
pub const MAX_LEN: usize = 64;

/// Short alphanumeric token scoping every resource path of one pack
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackId(String);

impl PackId {
    /// Validate and wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() || id.len() > MAX_LEN || !id.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(ResourceError::InvalidPackId(id));
        }
        Ok(Self(id))
    }

    /// Generate a random identifier for a new pack
    pub fn generate() -> Self {
        let mut rng = rng();
        let id = (0..GENERATED_LEN)
            .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
            .collect();
        Self(id)
    }

    /// Identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PackId {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for PackId {
    type Error = ResourceError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PackId> for String {
    fn from(id: PackId) -> Self {
        id.0
    }
}

impl AsRef<str> for PackId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        assert!(PackId::new("ABC123").is_ok());
        assert!(PackId::new("").is_err());
        assert!(PackId::new("has space").is_err());
        assert!(PackId::new("slash/id").is_err());
        assert!(PackId::new("a".repeat(MAX_LEN)).is_ok());
        assert!(PackId::new("a".repeat(MAX_LEN + 1)).is_err());
        assert_eq!(
            "x-y".parse::<PackId>(),
            Err(ResourceError::InvalidPackId("x-y".to_string()))
        );
    }

    #[test]
    fn test_generate() {
        let id = PackId::generate();
        assert_eq!(id.as_str().len(), GENERATED_LEN);
        assert!(PackId::new(id.as_str()).is_ok());

        // Collisions over a handful of draws would point at a broken generator
        let ids: std::collections::HashSet<_> = (0..32).map(|_| PackId::generate()).collect();
        assert!(ids.len() > 30);
    }

    #[test]
    fn test_serde_validates() {
        let id: PackId = serde_json::from_str("\"Qx7Lm2\"").expect("valid id");
        assert_eq!(id.as_str(), "Qx7Lm2");
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "\"Qx7Lm2\"");

        assert!(serde_json::from_str::<PackId>("\"bad id\"").is_err());
    }
}
