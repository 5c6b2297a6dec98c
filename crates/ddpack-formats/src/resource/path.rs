//! Internal resource paths and their filesystem counterparts

use crate::resource::error::{ResourceError, Result};
use crate::resource::kind::ResourceKind;
use crate::resource::pack_id::PackId;
use crate::resource::{
    DESCRIPTOR_EXTENSION, PREFIX, TAGS_RELATIVE_PATH, TILESET_DATA_EXTENSION,
    WALL_DATA_EXTENSION,
};
use std::fmt;
use std::path::{Component, Path};

/// Result of mapping a resource path back to a pack-relative path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<'a> {
    /// The pack descriptor, extracted as `pack.json`
    Descriptor,
    /// Path below `res://packs/<id>/`
    Relative(&'a str),
    /// Does not belong to the expected pack; left unmodified
    Foreign,
}

/// Forward-slash separated path inside a container
///
/// Pack resources look like `res://packs/<id>/<relative path>`; the pack
/// descriptor is `res://packs/<id>.json`. Paths read from existing
/// containers are kept verbatim even when they do not follow that shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Wrap a path verbatim
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Resource path for a pack-relative path
    ///
    /// Backslashes become forward slashes and leading separators or `./`
    /// segments are dropped.
    pub fn for_pack(id: &PackId, relative: &str) -> Self {
        let normalized = relative.replace('\\', "/");
        let trimmed = normalized
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect::<Vec<_>>()
            .join("/");
        Self(format!("{PREFIX}/{id}/{trimmed}"))
    }

    /// Resource path of the pack descriptor
    pub fn descriptor(id: &PackId) -> Self {
        Self(format!("{PREFIX}/{id}.{DESCRIPTOR_EXTENSION}"))
    }

    /// Resource path of the tag sidecar
    pub fn tags(id: &PackId) -> Self {
        Self::for_pack(id, TAGS_RELATIVE_PATH)
    }

    /// Resource path for a file below a pack root on disk
    pub fn from_file(root: &Path, file: &Path, id: &PackId) -> Result<Self> {
        let relative = file
            .strip_prefix(root)
            .map_err(|_| ResourceError::OutsideRoot {
                path: file.display().to_string(),
                root: root.display().to_string(),
            })?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => segments.push(segment.to_string_lossy()),
                Component::CurDir => {}
                _ => {
                    return Err(ResourceError::OutsideRoot {
                        path: file.display().to_string(),
                        root: root.display().to_string(),
                    });
                }
            }
        }

        if segments.is_empty() {
            return Err(ResourceError::EmptyPath(file.display().to_string()));
        }

        Ok(Self::for_pack(id, &segments.join("/")))
    }

    /// Path as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split `res://packs/<id>/<relative>` into its id and relative part
    pub fn split(&self) -> Option<(&str, &str)> {
        let rest = self.0.strip_prefix(PREFIX)?.strip_prefix('/')?;
        let (id, relative) = rest.split_once('/')?;
        if id.is_empty() || relative.is_empty() {
            return None;
        }
        Some((id, relative))
    }

    /// Pack id named by a descriptor path `res://packs/<id>.json`
    pub fn descriptor_id(&self) -> Option<&str> {
        let rest = self.0.strip_prefix(PREFIX)?.strip_prefix('/')?;
        let id = rest.strip_suffix(DESCRIPTOR_EXTENSION)?.strip_suffix('.')?;
        if id.is_empty() || id.contains('/') {
            return None;
        }
        Some(id)
    }

    /// Map back to a path relative to the pack root of `id`
    pub fn resolve(&self, id: &PackId) -> Resolved<'_> {
        if self.descriptor_id() == Some(id.as_str()) {
            return Resolved::Descriptor;
        }
        match self.split() {
            Some((owner, relative)) if owner == id.as_str() => Resolved::Relative(relative),
            _ => Resolved::Foreign,
        }
    }

    /// Classify by path shape
    pub fn kind(&self) -> ResourceKind {
        if self.descriptor_id().is_some() {
            return ResourceKind::Descriptor;
        }
        self.split()
            .map_or(ResourceKind::Other, |(_, relative)| ResourceKind::classify(relative))
    }

    /// Texture, including walls and tilesets
    pub fn is_texture(&self) -> bool {
        self.kind().is_texture()
    }

    /// Wall texture
    pub fn is_wall(&self) -> bool {
        self.kind().is_wall()
    }

    /// Tileset texture
    pub fn is_tileset(&self) -> bool {
        self.kind().is_tileset()
    }

    /// Generated thumbnail
    pub fn is_thumbnail(&self) -> bool {
        self.kind().is_thumbnail()
    }

    /// Tag sidecar
    pub fn is_tag_file(&self) -> bool {
        self.kind().is_tag_file()
    }

    /// Thumbnail location for a texture
    ///
    /// Named after the MD5 of the full resource path, not the file name.
    pub fn thumbnail_path(&self) -> Option<Self> {
        if !self.is_texture() {
            return None;
        }
        let (id, _) = self.split()?;
        let digest = hex::encode(md5::compute(self.0.as_bytes()).0);
        Some(Self(format!("{PREFIX}/{id}/thumbnails/{digest}.png")))
    }

    /// Wall or tileset definition that accompanies a texture
    ///
    /// `textures/walls/<name>.png` pairs with
    /// `data/walls/<name>.dungeondraft_wall`, tilesets likewise.
    pub fn data_path(&self) -> Option<Self> {
        let (directory, extension) = match self.kind() {
            ResourceKind::Wall => ("walls", WALL_DATA_EXTENSION),
            ResourceKind::Tileset => ("tilesets", TILESET_DATA_EXTENSION),
            _ => return None,
        };
        let (id, relative) = self.split()?;
        let file_name = relative.rsplit('/').next()?;
        let stem = file_name
            .rsplit_once('.')
            .map_or(file_name, |(stem, _)| stem);
        Some(Self(format!(
            "{PREFIX}/{id}/data/{directory}/{stem}.{extension}"
        )))
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourcePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourcePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for ResourcePath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn id() -> PackId {
        PackId::new("ABC123").expect("valid id")
    }

    #[test]
    fn test_wall_texture_resolution() {
        let path = ResourcePath::new("res://packs/ABC123/textures/walls/brick.png");
        assert_eq!(
            path.resolve(&id()),
            Resolved::Relative("textures/walls/brick.png")
        );
        assert!(path.is_texture());
        assert!(path.is_wall());
        assert!(!path.is_tileset());
    }

    #[test]
    fn test_descriptor() {
        let path = ResourcePath::descriptor(&id());
        assert_eq!(path.as_str(), "res://packs/ABC123.json");
        assert_eq!(path.descriptor_id(), Some("ABC123"));
        assert_eq!(path.resolve(&id()), Resolved::Descriptor);
        assert_eq!(path.kind(), ResourceKind::Descriptor);

        // Another pack's descriptor is foreign
        let other = PackId::new("Other1").expect("valid id");
        assert_eq!(path.resolve(&other), Resolved::Foreign);
    }

    #[test]
    fn test_foreign_paths_are_untouched() {
        for raw in [
            "textures/walls/brick.png",
            "res://packs/ZZZ/textures/a.png",
            "res://packs/ABC123/",
            "res://other/ABC123/a.png",
            "",
        ] {
            let path = ResourcePath::new(raw);
            assert_eq!(path.resolve(&id()), Resolved::Foreign, "{raw}");
            assert_eq!(path.as_str(), raw);
        }
    }

    #[test]
    fn test_for_pack_normalizes_separators() {
        let path = ResourcePath::for_pack(&id(), "\\textures\\objects\\./barrel.png");
        assert_eq!(
            path.as_str(),
            "res://packs/ABC123/textures/objects/barrel.png"
        );
    }

    #[test]
    fn test_from_file() {
        let root = PathBuf::from("/packs/mine");
        let file = root.join("textures").join("walls").join("brick.png");
        let path = ResourcePath::from_file(&root, &file, &id()).expect("inside root");
        assert_eq!(path.as_str(), "res://packs/ABC123/textures/walls/brick.png");

        let outside = PathBuf::from("/elsewhere/brick.png");
        assert!(matches!(
            ResourcePath::from_file(&root, &outside, &id()),
            Err(ResourceError::OutsideRoot { .. })
        ));

        assert!(matches!(
            ResourcePath::from_file(&root, &root, &id()),
            Err(ResourceError::EmptyPath(_))
        ));
    }

    #[test]
    fn test_thumbnail_path() {
        let texture = ResourcePath::new("res://packs/ABC123/textures/objects/barrel.png");
        let thumbnail = texture.thumbnail_path().expect("textures have thumbnails");
        let digest = hex::encode(md5::compute(texture.as_str()).0);
        assert_eq!(
            thumbnail.as_str(),
            format!("res://packs/ABC123/thumbnails/{digest}.png")
        );
        assert!(thumbnail.is_thumbnail());
        assert!(thumbnail.thumbnail_path().is_none());

        // Content-addressed by path, not by file name
        let renamed = ResourcePath::new("res://packs/ABC123/textures/other/barrel.png");
        assert_ne!(renamed.thumbnail_path(), Some(thumbnail));

        let data = ResourcePath::new("res://packs/ABC123/data/readme.txt");
        assert!(data.thumbnail_path().is_none());
    }

    #[test]
    fn test_data_path() {
        let wall = ResourcePath::new("res://packs/ABC123/textures/walls/stone/brick.png");
        assert_eq!(
            wall.data_path().expect("walls have data").as_str(),
            "res://packs/ABC123/data/walls/brick.dungeondraft_wall"
        );

        let tileset = ResourcePath::new("res://packs/ABC123/textures/tilesets/cave.webp");
        assert_eq!(
            tileset.data_path().expect("tilesets have data").as_str(),
            "res://packs/ABC123/data/tilesets/cave.dungeondraft_tileset"
        );

        let texture = ResourcePath::new("res://packs/ABC123/textures/objects/barrel.png");
        assert!(texture.data_path().is_none());
    }

    #[test]
    fn test_tags_path() {
        let tags = ResourcePath::tags(&id());
        assert_eq!(
            tags.as_str(),
            "res://packs/ABC123/data/default.dungeondraft_tags"
        );
        assert!(tags.is_tag_file());
    }
}
