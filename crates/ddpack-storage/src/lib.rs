//! Dungeondraft asset packs on disk
//!
//! This crate drives the container formats from `ddpack-formats` against
//! the filesystem:
//!
//! - **Building**: turn a pack directory into a `.dungeondraft_pack`
//!   container, optionally as a self-contained executable
//! - **Extracting**: unpack a container into a directory with `pack.json`
//!   at its root, verifying checksums on the way
//! - **Tags**: load, edit and save the tag sidecar of an unpacked pack
//!
//! Progress and skipped entries are reported through a [`Reporter`] passed
//! into each operation. Logging goes through `tracing`; installing a
//! subscriber is up to the application.
//!
//! # Example
//!
//! ```rust,no_run
//! use ddpack_storage::{ExtractConfig, PackExtractor, TracingReporter};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = PackExtractor::new(ExtractConfig::default());
//! let report = extractor.extract(
//!     Path::new("stone_walls.dungeondraft_pack"),
//!     Path::new("unpacked"),
//!     &mut TracingReporter,
//! )?;
//! println!("{} files written for pack {}", report.written.len(), report.pack_id);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::must_use_candidate)]

use ddpack_formats::descriptor::DescriptorError;
use ddpack_formats::pck::PckError;
use ddpack_formats::resource::ResourceError;
use ddpack_formats::tags::TagError;
use std::path::PathBuf;
use thiserror::Error;

// Pack building
pub mod builder;

// Pack extraction and inspection
pub mod extractor;

// Tag sidecar management
pub mod tag_library;

// Progress and warning delivery
pub mod reporter;

// Configuration
pub mod config;

pub use builder::{BuildReport, PackBuilder, SourceFile, ThumbnailRenderer};
pub use config::{BuildConfig, ExtractConfig, IntegrityPolicy};
pub use extractor::{
    ExtractReport, Inspection, PackExtractor, SkippedEntry, VerifyReport, inspect, verify,
};
pub use reporter::{FnReporter, Reporter, SkipReason, TracingReporter, Warning};
pub use tag_library::{SharedTagLibrary, TagLibrary};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Container could not be read or written.
    #[error("Container error: {0}")]
    Pck(#[from] PckError),

    /// File could not be mapped to a resource path.
    #[error("Resource path error: {0}")]
    Resource(#[from] ResourceError),

    /// Pack descriptor is malformed or names another pack.
    #[error("Pack descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Tag document could not be built.
    #[error("Tag document error: {0}")]
    Tags(#[from] TagError),

    /// Tag sidecar exists but is not a valid document.
    #[error("Malformed tag sidecar {path}: {source}")]
    SidecarParse {
        /// Sidecar location
        path: PathBuf,
        /// Parse failure
        source: TagError,
    },

    /// Tag operation attempted before the sidecar was loaded.
    #[error("Tag library not loaded: {0}")]
    TagsNotLoaded(PathBuf),

    /// Source file size differs from the size it was listed with.
    #[error("Source file {path} changed during build: expected {expected} bytes, found {actual}")]
    SourceChanged {
        /// Source file
        path: PathBuf,
        /// Size given in the file list
        expected: u64,
        /// Size found when reading
        actual: u64,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StorageError {
    /// A single entry failed checksum verification
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, Self::Pck(e) if e.is_integrity_error())
    }
}

/// Version information for the storage system.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File extension of packed asset packs.
pub const PACK_EXTENSION: &str = "dungeondraft_pack";
