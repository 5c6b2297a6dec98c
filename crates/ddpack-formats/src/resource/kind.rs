//! Classification of resources by path shape

/// Image extensions Dungeondraft loads as textures
pub const TEXTURE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// What a resource is, derived purely from its relative path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// The pack descriptor (`res://packs/<id>.json`)
    Descriptor,
    /// Wall texture under `textures/walls/`
    Wall,
    /// Tileset texture under `textures/tilesets/`
    Tileset,
    /// Any other texture under `textures/`
    Texture,
    /// Generated preview under `thumbnails/`
    Thumbnail,
    /// The tag sidecar `data/default.dungeondraft_tags`
    TagFile,
    /// Other files under `data/`
    Data,
    /// Anything else
    Other,
}

impl ResourceKind {
    /// Classify a pack-relative path such as `textures/walls/brick.png`
    pub fn classify(relative: &str) -> Self {
        if relative == super::TAGS_RELATIVE_PATH {
            return Self::TagFile;
        }

        if let Some(rest) = relative.strip_prefix("textures/") {
            if !has_extension(rest, TEXTURE_EXTENSIONS) {
                return Self::Other;
            }
            if rest.starts_with("walls/") {
                return Self::Wall;
            }
            if rest.starts_with("tilesets/") {
                return Self::Tileset;
            }
            return Self::Texture;
        }

        if relative.starts_with("thumbnails/") {
            return Self::Thumbnail;
        }

        if relative.starts_with("data/") {
            return Self::Data;
        }

        Self::Other
    }

    /// Walls and tilesets are textures too
    pub fn is_texture(self) -> bool {
        matches!(self, Self::Texture | Self::Wall | Self::Tileset)
    }

    /// Wall texture
    pub fn is_wall(self) -> bool {
        self == Self::Wall
    }

    /// Tileset texture
    pub fn is_tileset(self) -> bool {
        self == Self::Tileset
    }

    /// Generated thumbnail
    pub fn is_thumbnail(self) -> bool {
        self == Self::Thumbnail
    }

    /// Tag sidecar
    pub fn is_tag_file(self) -> bool {
        self == Self::TagFile
    }
}

/// Case-insensitive extension check on a `/` separated path
pub fn has_extension(path: &str, extensions: &[&str]) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    file_name.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.is_empty() && extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    })
}
