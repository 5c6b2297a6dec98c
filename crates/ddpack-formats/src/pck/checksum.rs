//! MD5 checksums stored in directory records

use binrw::{BinRead, BinWrite};
use std::fmt;

/// 16-byte MD5 digest of an entry payload
///
/// The all-zero value is a sentinel meaning "no integrity check was
/// recorded"; Godot writes it when packing without checksums.
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Checksum([u8; 16]);

impl Checksum {
    /// The "unchecked" sentinel
    pub const UNCHECKED: Self = Self([0u8; 16]);

    /// Create checksum from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Compute the MD5 digest of data
    pub fn compute(data: &[u8]) -> Self {
        Self(md5::compute(data).into())
    }

    /// Parse checksum from a 32 character hex string
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(hex, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// True for the all-zero sentinel
    pub fn is_unchecked(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Check data against this checksum
    ///
    /// Returns the digest of `data` on mismatch. The unchecked sentinel
    /// accepts anything.
    pub fn verify(&self, data: &[u8]) -> Result<(), Self> {
        if self.is_unchecked() {
            return Ok(());
        }
        let actual = Self::compute(data);
        if actual == *self { Ok(()) } else { Err(actual) }
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
