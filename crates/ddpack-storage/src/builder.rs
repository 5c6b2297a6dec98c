//! Building packs from a directory of assets
//!
//! Directory walking is the caller's job: the builder receives the list of
//! files to pack as [`SourceFile`]s, all below one pack root. The pack
//! descriptor is supplied separately and always becomes entry zero, so a
//! `pack.json` found at the root of the file list is ignored.

use crate::config::BuildConfig;
use crate::reporter::{Reporter, Warning};
use crate::{Result, StorageError};
use ddpack_formats::descriptor::PackDescriptor;
use ddpack_formats::pck::{PckEntry, PckError, PckWriter};
use ddpack_formats::resource::{DESCRIPTOR_FILE_NAME, PackId, ResourcePath};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// A file to pack, as listed by the directory walker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Location on disk, below the pack root
    pub path: PathBuf,
    /// Size when the file was listed
    pub size: u64,
}

impl SourceFile {
    /// Describe a file with an explicit size
    pub fn new<P: AsRef<Path>>(path: P, size: u64) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            size,
        }
    }

    /// Describe a file using its current size on disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let size = fs::metadata(path.as_ref())?.len();
        Ok(Self::new(path, size))
    }
}

/// Produces thumbnail images for textures
///
/// Implemented by the image subsystem; the builder never decodes images.
pub trait ThumbnailRenderer {
    /// PNG bytes for a texture, or `None` if it cannot be rendered
    fn render(&self, path: &ResourcePath, data: &[u8]) -> Option<Vec<u8>>;
}

impl<F> ThumbnailRenderer for F
where
    F: Fn(&ResourcePath, &[u8]) -> Option<Vec<u8>>,
{
    fn render(&self, path: &ResourcePath, data: &[u8]) -> Option<Vec<u8>> {
        self(path, data)
    }
}

/// Outcome of a successful build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Id of the built pack
    pub pack_id: PackId,
    /// Container file written
    pub output: PathBuf,
    /// Number of directory entries, descriptor included
    pub entries: usize,
    /// Thumbnails rendered during the build
    pub thumbnails: usize,
    /// Size of the output file in bytes
    pub bytes: u64,
}

enum Payload {
    File { path: PathBuf, size: u64 },
    Memory(Vec<u8>),
}

impl Payload {
    fn size(&self) -> u64 {
        match self {
            Self::File { size, .. } => *size,
            Self::Memory(data) => data.len() as u64,
        }
    }

    fn load(&self) -> Result<Vec<u8>> {
        match self {
            Self::File { path, size } => {
                let data = fs::read(path)?;
                if data.len() as u64 != *size {
                    return Err(StorageError::SourceChanged {
                        path: path.clone(),
                        expected: *size,
                        actual: data.len() as u64,
                    });
                }
                Ok(data)
            }
            Self::Memory(data) => Ok(data.clone()),
        }
    }
}

/// Builds one pack from a root directory and descriptor
pub struct PackBuilder<'a> {
    root: PathBuf,
    descriptor: PackDescriptor,
    config: BuildConfig,
    renderer: Option<&'a dyn ThumbnailRenderer>,
}

impl<'a> PackBuilder<'a> {
    /// Create a builder with the default configuration
    pub fn new<P: AsRef<Path>>(root: P, descriptor: PackDescriptor) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            descriptor,
            config: BuildConfig::default(),
            renderer: None,
        }
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a thumbnail renderer for textures
    #[must_use]
    pub fn with_renderer(mut self, renderer: &'a dyn ThumbnailRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Pack id every entry is scoped to
    pub fn pack_id(&self) -> &PackId {
        &self.descriptor.id
    }

    /// Write the pack to `output`
    ///
    /// The container is assembled in a temporary file next to `output` and
    /// only moved into place once complete.
    ///
    /// # Errors
    /// Returns error if:
    /// - The configuration is invalid
    /// - A file lies outside the pack root or two files map to one path
    /// - A source file changed size since it was listed
    /// - Any I/O operation fails
    pub fn build(
        &self,
        files: &[SourceFile],
        output: &Path,
        reporter: &mut dyn Reporter,
    ) -> Result<BuildReport> {
        self.config.validate()?;
        let id = &self.descriptor.id;
        info!(
            "Building pack {} from {} files under {}",
            id,
            files.len(),
            self.root.display()
        );

        let mut payloads = self.collect(files)?;
        let thumbnails = self.render_thumbnails(&mut payloads, reporter)?;

        let entries: Vec<PckEntry> = payloads
            .iter()
            .map(|(path, payload)| PckEntry::new(path.clone(), payload.size()))
            .collect();
        let total = entries.len();

        let directory = output.parent().filter(|p| !p.as_os_str().is_empty());
        let mut temp = match directory {
            Some(directory) => NamedTempFile::new_in(directory)?,
            None => NamedTempFile::new_in(".")?,
        };

        {
            let mut stream = BufWriter::new(temp.as_file_mut());
            if let Some(stub) = &self.config.executable_stub {
                let copied = io::copy(&mut File::open(stub)?, &mut stream)?;
                debug!("Prepended {} byte executable stub {}", copied, stub.display());
            }

            let mut writer = PckWriter::new(
                stream,
                self.config.engine_version,
                entries,
                self.config.compute_checksums,
            )?;

            let mut done = 0;
            while let Some(entry) = writer.next_entry() {
                let path = entry.path.clone();
                let payload = payloads.get(&path).ok_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, format!("no payload for {path}"))
                })?;
                let data = payload.load()?;
                let entry = writer.write_payload(&data)?;
                debug!("Packed {} ({} bytes at {})", entry.path, entry.size, entry.offset);

                done += 1;
                reporter.progress(done, total);
            }

            let stream = if self.config.executable_stub.is_some() {
                writer.finish_embedded()?
            } else {
                writer.finish()?
            };
            stream.into_inner().map_err(io::IntoInnerError::into_error)?;
        }

        temp.as_file_mut().sync_all()?;
        let file = temp.persist(output).map_err(|e| e.error)?;
        let bytes = file.metadata()?.len();

        info!(
            "Built pack {} at {}: {} entries, {} bytes",
            id,
            output.display(),
            total,
            bytes
        );

        Ok(BuildReport {
            pack_id: id.clone(),
            output: output.to_path_buf(),
            entries: total,
            thumbnails,
            bytes,
        })
    }

    fn collect(&self, files: &[SourceFile]) -> Result<BTreeMap<ResourcePath, Payload>> {
        let id = &self.descriptor.id;
        let mut payloads = BTreeMap::new();
        payloads.insert(
            ResourcePath::descriptor(id),
            Payload::Memory(self.descriptor.build()?),
        );

        for file in files {
            if file.path.strip_prefix(&self.root).ok() == Some(Path::new(DESCRIPTOR_FILE_NAME)) {
                debug!("Ignoring {}, descriptor is supplied separately", file.path.display());
                continue;
            }

            let path = ResourcePath::from_file(&self.root, &file.path, id)?;
            let payload = Payload::File {
                path: file.path.clone(),
                size: file.size,
            };
            if payloads.insert(path.clone(), payload).is_some() {
                return Err(PckError::DuplicatePath(path.to_string()).into());
            }
        }
        Ok(payloads)
    }

    fn render_thumbnails(
        &self,
        payloads: &mut BTreeMap<ResourcePath, Payload>,
        reporter: &mut dyn Reporter,
    ) -> Result<usize> {
        let Some(renderer) = self.renderer.filter(|_| self.config.generate_thumbnails) else {
            return Ok(0);
        };

        let mut rendered = Vec::new();
        for (path, payload) in payloads.iter() {
            let Some(thumbnail) = path.thumbnail_path() else {
                continue;
            };
            if payloads.contains_key(&thumbnail) {
                continue;
            }
            match renderer.render(path, &payload.load()?) {
                Some(image) => rendered.push((thumbnail, Payload::Memory(image))),
                None => reporter.warning(&Warning::NoThumbnail { path: path.clone() }),
            }
        }

        let count = rendered.len();
        debug!("Rendered {} thumbnails", count);
        payloads.extend(rendered);
        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::reporter::TracingReporter;
    use ddpack_formats::pck::PckArchive;
    use tempfile::tempdir;

    struct Collect(Vec<Warning>);

    impl Reporter for Collect {
        fn warning(&mut self, warning: &Warning) {
            self.0.push(warning.clone());
        }
    }

    fn descriptor() -> PackDescriptor {
        PackDescriptor::new("Builder", PackId::new("Bu1lder").expect("id"))
    }

    fn write(root: &Path, relative: &str, data: &[u8]) -> SourceFile {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, data).expect("write");
        SourceFile::from_path(path).expect("source")
    }

    #[test]
    fn test_descriptor_first_and_sorted() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("pack");
        let files = vec![
            write(&root, "textures/b.png", b"bb"),
            write(&root, "textures/a.png", b"a"),
            write(&root, "pack.json", b"{}"),
        ];

        let output = dir.path().join("out.dungeondraft_pack");
        let report = PackBuilder::new(&root, descriptor())
            .build(&files, &output, &mut TracingReporter)
            .expect("build");
        assert_eq!(report.entries, 3);
        assert_eq!(report.thumbnails, 0);

        let archive = PckArchive::open(&output).expect("archive");
        let paths: Vec<_> = archive.entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "res://packs/Bu1lder.json",
                "res://packs/Bu1lder/textures/a.png",
                "res://packs/Bu1lder/textures/b.png",
            ]
        );
    }

    #[test]
    fn test_source_changed() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("pack");
        let mut file = write(&root, "textures/a.png", b"abc");
        file.size = 10;

        let output = dir.path().join("out.dungeondraft_pack");
        let err = PackBuilder::new(&root, descriptor())
            .build(&[file], &output, &mut TracingReporter)
            .expect_err("size changed");
        assert!(matches!(
            err,
            StorageError::SourceChanged {
                expected: 10,
                actual: 3,
                ..
            }
        ));
        assert!(!output.exists());
    }

    #[test]
    fn test_duplicate_sources_rejected() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("pack");
        let file = write(&root, "textures/a.png", b"abc");

        let err = PackBuilder::new(&root, descriptor())
            .build(
                &[file.clone(), file],
                &dir.path().join("out.dungeondraft_pack"),
                &mut TracingReporter,
            )
            .expect_err("duplicate");
        assert!(matches!(err, StorageError::Pck(PckError::DuplicatePath(_))));
    }

    #[test]
    fn test_file_outside_root_rejected() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("pack");
        let stray = write(dir.path(), "stray.png", b"x");

        let err = PackBuilder::new(&root, descriptor())
            .build(&[stray], &dir.path().join("out.dungeondraft_pack"), &mut TracingReporter)
            .expect_err("outside root");
        assert!(matches!(err, StorageError::Resource(_)));
    }

    #[test]
    fn test_thumbnails_rendered_for_textures() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("pack");
        let files = vec![
            write(&root, "textures/walls/brick.png", b"brick"),
            write(&root, "textures/objects/skip.png", b"skip"),
            write(&root, "data/walls/brick.dungeondraft_wall", b"{}"),
        ];

        let renderer = |path: &ResourcePath, data: &[u8]| {
            (!path.as_str().contains("skip")).then(|| data.to_ascii_uppercase())
        };

        let mut reporter = Collect(Vec::new());

        let output = dir.path().join("out.dungeondraft_pack");
        let report = PackBuilder::new(&root, descriptor())
            .with_renderer(&renderer)
            .build(&files, &output, &mut reporter)
            .expect("build");
        assert_eq!(report.thumbnails, 1);
        assert_eq!(reporter.0.len(), 1);

        let brick = ResourcePath::new("res://packs/Bu1lder/textures/walls/brick.png");
        let thumbnail = brick.thumbnail_path().expect("texture");
        let mut archive = PckArchive::open(&output).expect("archive");
        assert_eq!(
            archive.read_path(thumbnail.as_str()).expect("read"),
            Some(b"BRICK".to_vec())
        );
    }

    #[test]
    fn test_thumbnails_disabled() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("pack");
        let files = vec![write(&root, "textures/a.png", b"a")];
        let renderer = |_: &ResourcePath, data: &[u8]| Some(data.to_vec());

        let report = PackBuilder::new(&root, descriptor())
            .with_config(BuildConfig::default().with_thumbnails(false))
            .with_renderer(&renderer)
            .build(&files, &dir.path().join("out.dungeondraft_pack"), &mut TracingReporter)
            .expect("build");
        assert_eq!(report.thumbnails, 0);
        assert_eq!(report.entries, 2);
    }
}
