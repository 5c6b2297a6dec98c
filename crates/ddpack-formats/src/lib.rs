//! File formats of Dungeondraft asset packs
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Intentional for binary operations
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::doc_markdown)] // Godot and Dungeondraft terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Domain-specific naming patterns
#![allow(clippy::redundant_closure_for_method_calls)] // Iterator chains
#![allow(clippy::return_self_not_must_use)] // Builder patterns
#![allow(clippy::use_self)] // Type clarity
//! This crate provides symmetric (parser and builder) implementations for the
//! formats that make up a Dungeondraft asset pack.
//!
//! # Supported Formats
//!
//! - **PCK**: Godot resource container holding every pack file
//! - **Resource paths**: `res://packs/<id>/...` naming, classification and
//!   derived paths
//! - **Pack descriptor**: the `pack.json` document stored as entry zero
//! - **Tags**: tag and tag set sidecar document
//!
//! Nothing here touches the filesystem on its own; all I/O goes through
//! caller-supplied readers and writers.

#![warn(missing_docs)]

/// Godot PCK container header, directory and payload access
pub mod pck;

/// Pack descriptor document
pub mod descriptor;

/// Resource path mapping and classification
pub mod resource;

/// Tag and tag set store
pub mod tags;

pub use descriptor::{DescriptorError, PackDescriptor};
pub use pck::{PckArchive, PckEntry, PckError, PckWriter};
pub use resource::{PackId, ResourceKind, ResourcePath};
pub use tags::TagStore;
