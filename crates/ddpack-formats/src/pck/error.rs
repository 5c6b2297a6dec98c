//! Error types for PCK container parsing and building

use crate::pck::checksum::Checksum;
use crate::pck::header::EngineVersion;
use thiserror::Error;

/// Errors that can occur when reading or writing PCK containers
#[derive(Error, Debug)]
pub enum PckError {
    /// No magic marker found at any candidate position
    #[error("Not a PCK container: {reason}")]
    NotAContainer {
        /// Which candidate positions were tried and why they failed
        reason: String,
    },

    /// Format version newer than this implementation understands
    #[error("Unsupported PCK format version: {found} (max supported {supported})")]
    UnsupportedFormatVersion {
        /// Version found in the header
        found: u32,
        /// Highest version this implementation reads
        supported: u32,
    },

    /// Engine version newer than this implementation understands
    #[error("Unsupported engine version: {found} (max supported {supported})")]
    UnsupportedEngineVersion {
        /// Engine version found in the header
        found: EngineVersion,
        /// Highest engine version this implementation reads
        supported: EngineVersion,
    },

    /// Directory record declared a negative path length
    #[error("Negative path length {length} in directory record at offset {offset}")]
    NegativePathLength {
        /// Declared length
        length: i32,
        /// Stream position of the record
        offset: u64,
    },

    /// Directory record path is not valid UTF-8
    #[error("Invalid UTF-8 path in directory record at offset {offset}")]
    InvalidPath {
        /// Stream position of the record
        offset: u64,
    },

    /// Fewer payload bytes available than the entry declares
    #[error("Truncated read for {path}: expected {expected} bytes at offset {offset}, got {actual}")]
    TruncatedRead {
        /// Resource path of the entry
        path: String,
        /// Absolute stream offset of the payload
        offset: u64,
        /// Declared size
        expected: u64,
        /// Bytes actually read
        actual: u64,
    },

    /// Payload digest does not match the stored checksum
    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Resource path of the entry
        path: String,
        /// Checksum stored in the directory
        expected: Checksum,
        /// Checksum of the bytes actually read
        actual: Checksum,
    },

    /// No pack descriptor entry in the directory
    #[error("Pack descriptor entry not found (expected res://packs/<id>.json)")]
    MissingDescriptor,

    /// The same resource path appears twice
    #[error("Duplicate resource path: {0}")]
    DuplicatePath(String),

    /// Entry count does not fit the header field or does not match
    #[error("Entry count mismatch: header declares {expected}, got {actual}")]
    EntryCount {
        /// Count declared or expected
        expected: usize,
        /// Count actually present
        actual: usize,
    },

    /// Payload written for an entry has a different size than planned
    #[error("Payload size mismatch for {path}: planned {expected} bytes, wrote {actual}")]
    PayloadSize {
        /// Resource path of the entry
        path: String,
        /// Planned size
        expected: u64,
        /// Bytes supplied
        actual: u64,
    },

    /// Pack descriptor entry is not a valid descriptor document
    #[error("Invalid pack descriptor: {0}")]
    Descriptor(#[from] crate::descriptor::DescriptorError),

    /// `BinRW` parsing/writing error
    #[error("Binary format error: {0}")]
    BinRw(#[from] binrw::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PckError {
    /// The stream cannot be trusted; the whole operation should stop
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::NotAContainer { .. }
                | Self::UnsupportedFormatVersion { .. }
                | Self::UnsupportedEngineVersion { .. }
                | Self::NegativePathLength { .. }
                | Self::InvalidPath { .. }
                | Self::EntryCount { .. }
                | Self::BinRw(_)
        )
    }

    /// A single entry failed verification
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, Self::ChecksumMismatch { .. })
    }
}

/// Type alias for PCK operation results
pub type Result<T> = std::result::Result<T, PckError>;
