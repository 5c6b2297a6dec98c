//! Godot PCK container support
//!
//! A PCK container is a header, a directory of entries and the concatenated
//! entry payloads. All multi-byte fields are little-endian.
//!
//! # Container Structure
//!
//! - **Magic** (4 bytes): `GDPC`
//! - **Header** (84 bytes): format version, engine version, 16 reserved
//!   words, entry count
//! - **Directory**: one record per entry (length-prefixed path, offset,
//!   size, MD5)
//! - **Payloads**: entry bytes in directory order, no padding
//! - **Trailer** (self-contained executables only): container length and
//!   magic at the very end of the file
//!
//! # Reading
//!
//! ```rust,no_run
//! use ddpack_formats::pck::PckArchive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut archive = PckArchive::open("walls.dungeondraft_pack")?;
//! println!("pack id: {}", archive.pack_id()?);
//!
//! for entry in archive.entries().to_vec() {
//!     let data = archive.read_entry(&entry)?;
//!     println!("{} ({} bytes)", entry.path, data.len());
//! }
//! # Ok(())
//! # }
//! ```

mod archive;
mod checksum;
mod directory;
mod entry;
mod error;
mod header;
mod layout;
mod locate;
mod writer;

pub use archive::PckArchive;
pub use checksum::Checksum;
pub use directory::PckDirectory;
pub use entry::{FIXED_RECORD_SIZE, PckEntry};
pub use error::{PckError, Result};
pub use header::{EngineVersion, FORMAT_VERSION, MAGIC, MAGIC_BYTES, PckHeader, RESERVED_WORDS};
pub use layout::{assign_offsets, directory_size, order_entries};
pub use locate::{ContainerLayout, PROBE_ORDER, Probe, TRAILER_SIZE, locate};
pub use writer::PckWriter;
