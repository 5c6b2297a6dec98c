//! Pack descriptor (`pack.json`)
//!
//! A small JSON document stored as the first container entry. Only the id
//! matters to the container engine; every other field is carried through
//! untouched, including the color override block and the third-party
//! access flag that Dungeondraft writes.

use crate::resource::PackId;
use serde::{Deserialize, Serialize};
use std::io::Read;
use thiserror::Error;

/// Errors that can occur when parsing or building a pack descriptor
#[derive(Error, Debug)]
pub enum DescriptorError {
    /// JSON parsing or serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Descriptor names a different pack than its entry path
    #[error("Descriptor id {found} does not match pack id {expected}")]
    IdMismatch {
        /// Id the container path names
        expected: PackId,
        /// Id the document names
        found: PackId,
    },
}

/// Contents of `pack.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackDescriptor {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Pack identifier
    pub id: PackId,

    /// Free-form version string
    #[serde(default)]
    pub version: String,

    /// Free-form author string
    #[serde(default)]
    pub author: String,

    /// Fields this crate does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PackDescriptor {
    /// Create a descriptor with empty free-text fields
    pub fn new(name: impl Into<String>, id: PackId) -> Self {
        Self {
            name: name.into(),
            id,
            version: String::new(),
            author: String::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Parse from JSON bytes
    pub fn parse(data: &[u8]) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Parse from a reader containing JSON
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, DescriptorError> {
        let mut content = Vec::new();
        reader.read_to_end(&mut content)?;
        Self::parse(&content)
    }

    /// Build pretty-printed JSON bytes
    pub fn build(&self) -> Result<Vec<u8>, DescriptorError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Check the document against the id its entry path names
    pub fn expect_id(&self, expected: &PackId) -> Result<(), DescriptorError> {
        if &self.id == expected {
            Ok(())
        } else {
            Err(DescriptorError::IdMismatch {
                expected: expected.clone(),
                found: self.id.clone(),
            })
        }
    }
}
