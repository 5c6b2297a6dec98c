//! PCK header parsing and building

use crate::pck::error::{PckError, Result};
use binrw::{BinRead, BinWrite};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Container magic, `GDPC` on disk
pub const MAGIC: u32 = 0x4350_4447;

/// Magic as it appears in the byte stream
pub const MAGIC_BYTES: [u8; 4] = MAGIC.to_le_bytes();

/// Highest format version this implementation reads and the one it writes
pub const FORMAT_VERSION: u32 = 1;

/// Number of reserved 32-bit words after the engine version
pub const RESERVED_WORDS: usize = 16;

/// Godot engine version recorded in the header
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, BinRead, BinWrite, Serialize, Deserialize,
)]
#[brw(little)]
pub struct EngineVersion {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
    /// Patch version
    pub patch: u32,
}

impl EngineVersion {
    /// Newest engine line whose containers this implementation reads
    pub const MAX_SUPPORTED: Self = Self::new(3, 6, 0);

    /// Version written into freshly authored containers
    pub const DEFAULT: Self = Self::new(3, 4, 0);

    /// Create a new engine version
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether containers written by this engine version can be read
    ///
    /// Patch releases never change the container layout, so only the
    /// major/minor pair is compared.
    pub fn is_supported(&self) -> bool {
        (self.major, self.minor) <= (Self::MAX_SUPPORTED.major, Self::MAX_SUPPORTED.minor)
    }
}

impl Default for EngineVersion {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// PCK header (the fields after the magic)
///
/// Layout, little-endian:
/// - Magic `GDPC` (4 bytes, located separately, see [`crate::pck::locate`])
/// - Format version (4 bytes)
/// - Engine major, minor, patch (3 x 4 bytes)
/// - Reserved (16 x 4 bytes, zero)
/// - Entry count (4 bytes)
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct PckHeader {
    /// Container format version, currently 1
    pub format_version: u32,

    /// Engine version that wrote the container
    pub engine_version: EngineVersion,

    /// Reserved words, preserved verbatim
    pub reserved: [u32; RESERVED_WORDS],

    /// Number of directory records that follow
    pub entry_count: u32,
}

impl PckHeader {
    /// Encoded size including the magic
    pub const SIZE: u64 = 4 + 4 + 12 + (RESERVED_WORDS as u64 * 4) + 4;

    /// Create a header for a fresh container
    pub fn new(engine_version: EngineVersion, entry_count: u32) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            engine_version,
            reserved: [0; RESERVED_WORDS],
            entry_count,
        }
    }

    /// Reject versions newer than this implementation understands
    pub fn validate(&self) -> Result<()> {
        if self.format_version > FORMAT_VERSION {
            return Err(PckError::UnsupportedFormatVersion {
                found: self.format_version,
                supported: FORMAT_VERSION,
            });
        }

        if !self.engine_version.is_supported() {
            return Err(PckError::UnsupportedEngineVersion {
                found: self.engine_version,
                supported: EngineVersion::MAX_SUPPORTED,
            });
        }

        Ok(())
    }
}
