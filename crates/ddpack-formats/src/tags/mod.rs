//! Tags and tag sets
//!
//! Dungeondraft lets users attach tags to resources and group tags into
//! sets. The mapping is kept next to the pack content in
//! `data/default.dungeondraft_tags`, not inside the container directory.
//!
//! ```json
//! {
//!   "tags": { "rock": ["res://packs/ABC123/textures/objects/rock.png"] },
//!   "sets": { "nature": ["rock"] }
//! }
//! ```

mod error;
mod store;

pub use error::{Result, TagError};
pub use store::TagStore;
