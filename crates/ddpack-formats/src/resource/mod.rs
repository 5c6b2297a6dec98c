//! Resource paths of Dungeondraft asset packs
//!
//! Every file in a pack lives under `res://packs/<id>/`, where `<id>` is the
//! pack's [`PackId`]. The pack descriptor sits next to that directory as
//! `res://packs/<id>.json` and is extracted as `pack.json`.
//!
//! # Derived paths
//!
//! | Source | Derived |
//! |--------|---------|
//! | `textures/**/<name>.png` | `thumbnails/<md5 of resource path>.png` |
//! | `textures/walls/<name>.png` | `data/walls/<name>.dungeondraft_wall` |
//! | `textures/tilesets/<name>.png` | `data/tilesets/<name>.dungeondraft_tileset` |
//! | pack | `data/default.dungeondraft_tags` |
//!
//! ```rust
//! use ddpack_formats::resource::{PackId, ResourcePath, Resolved};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let id = PackId::new("ABC123")?;
//! let path = ResourcePath::new("res://packs/ABC123/textures/walls/brick.png");
//!
//! assert_eq!(path.resolve(&id), Resolved::Relative("textures/walls/brick.png"));
//! assert!(path.is_texture() && path.is_wall());
//! # Ok(())
//! # }
//! ```

mod error;
mod kind;
mod pack_id;
mod path;

pub use error::{ResourceError, Result};
pub use kind::{ResourceKind, TEXTURE_EXTENSIONS, has_extension};
pub use pack_id::PackId;
pub use path::{Resolved, ResourcePath};

/// Scheme and directory shared by all pack resources
pub const PREFIX: &str = "res://packs";

/// Extension of the descriptor entry
pub const DESCRIPTOR_EXTENSION: &str = "json";

/// File name the descriptor is extracted to
pub const DESCRIPTOR_FILE_NAME: &str = "pack.json";

/// Tag sidecar location relative to the pack root
pub const TAGS_RELATIVE_PATH: &str = "data/default.dungeondraft_tags";

/// Extension of wall definitions
pub const WALL_DATA_EXTENSION: &str = "dungeondraft_wall";

/// Extension of tileset definitions
pub const TILESET_DATA_EXTENSION: &str = "dungeondraft_tileset";
