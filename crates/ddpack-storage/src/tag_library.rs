//! Tag sidecar of an unpacked pack
//!
//! The sidecar is read lazily: a [`TagLibrary`] starts out unloaded and
//! every tag operation fails with [`StorageError::TagsNotLoaded`] until
//! [`TagLibrary::load`] has run. Nothing is written back until
//! [`TagLibrary::save`] is called.

use crate::{Result, StorageError};
use ddpack_formats::resource::TAGS_RELATIVE_PATH;
use ddpack_formats::tags::TagStore;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info};

#[derive(Debug)]
enum State {
    Unloaded,
    Loaded(TagStore),
}

/// Tag store bound to its sidecar file
#[derive(Debug)]
pub struct TagLibrary {
    path: PathBuf,
    state: State,
}

impl TagLibrary {
    /// Library for the sidecar at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            state: State::Unloaded,
        }
    }

    /// Library for the sidecar of the pack unpacked at `root`
    pub fn for_pack_root<P: AsRef<Path>>(root: P) -> Self {
        Self::new(root.as_ref().join(TAGS_RELATIVE_PATH))
    }

    /// Sidecar location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the sidecar has been loaded
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, State::Loaded(_))
    }

    /// Read the sidecar, replacing anything loaded before
    ///
    /// A missing sidecar yields an empty store.
    pub fn load(&mut self) -> Result<&TagStore> {
        let store = match fs::read(&self.path) {
            Ok(data) => TagStore::parse(&data).map_err(|source| StorageError::SidecarParse {
                path: self.path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No tag sidecar at {}, starting empty", self.path.display());
                TagStore::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            "Loaded {} tags and {} sets from {}",
            store.tags().len(),
            store.sets().len(),
            self.path.display()
        );
        self.state = State::Loaded(store);
        self.store()
    }

    /// Drop the loaded store without saving
    pub fn unload(&mut self) {
        self.state = State::Unloaded;
    }

    /// Loaded store
    pub fn store(&self) -> Result<&TagStore> {
        match &self.state {
            State::Loaded(store) => Ok(store),
            State::Unloaded => Err(StorageError::TagsNotLoaded(self.path.clone())),
        }
    }

    /// Loaded store, for direct mutation
    pub fn store_mut(&mut self) -> Result<&mut TagStore> {
        match &mut self.state {
            State::Loaded(store) => Ok(store),
            State::Unloaded => Err(StorageError::TagsNotLoaded(self.path.clone())),
        }
    }

    /// Add resources to a tag
    pub fn tag<I, S>(&mut self, tag: &str, resources: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.store_mut()?.tag(tag, resources);
        Ok(())
    }

    /// Remove resources from a tag
    pub fn untag<I, S>(&mut self, tag: &str, resources: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.store_mut()?.untag(tag, resources))
    }

    /// Replace every tag membership of one resource
    pub fn retag<I, S>(&mut self, resource: &str, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.store_mut()?.retag(resource, tags);
        Ok(())
    }

    /// Add tags to a set
    pub fn add_tag_to_set<I, S>(&mut self, set: &str, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.store_mut()?.add_tag_to_set(set, tags);
        Ok(())
    }

    /// Remove tags from a set
    pub fn remove_tag_from_set<I, S>(&mut self, set: &str, tags: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.store_mut()?.remove_tag_from_set(set, tags))
    }

    /// Delete a tag
    pub fn delete_tag(&mut self, tag: &str) -> Result<bool> {
        Ok(self.store_mut()?.delete_tag(tag))
    }

    /// Delete a set
    pub fn delete_set(&mut self, set: &str) -> Result<bool> {
        Ok(self.store_mut()?.delete_set(set))
    }

    /// Tags shared by all given resources
    pub fn tags_for<S: AsRef<str>>(&self, resources: &[S]) -> Result<BTreeSet<String>> {
        Ok(self.store()?.tags_for(resources))
    }

    /// Write the store back to the sidecar
    ///
    /// The document is written to a temporary file in the same directory
    /// and renamed over the sidecar.
    pub fn save(&self) -> Result<()> {
        let data = self.store()?.build()?;

        let directory = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(directory)?;

        let mut temp = NamedTempFile::new_in(directory)?;
        temp.write_all(&data)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;

        info!("Saved tag sidecar {} ({} bytes)", self.path.display(), data.len());
        Ok(())
    }
}

/// [`TagLibrary`] shared between threads
///
/// Every call holds the lock for its whole duration, so compound changes
/// such as a retag are never observed half done.
#[derive(Debug, Clone)]
pub struct SharedTagLibrary {
    inner: Arc<Mutex<TagLibrary>>,
}

impl SharedTagLibrary {
    /// Share a library
    pub fn new(library: TagLibrary) -> Self {
        Self {
            inner: Arc::new(Mutex::new(library)),
        }
    }

    /// Load the sidecar
    pub fn load(&self) -> Result<()> {
        self.inner.lock().load().map(|_| ())
    }

    /// Save the sidecar
    pub fn save(&self) -> Result<()> {
        self.inner.lock().save()
    }

    /// Whether the sidecar has been loaded
    pub fn is_loaded(&self) -> bool {
        self.inner.lock().is_loaded()
    }

    /// Run `f` against the loaded store with the lock held
    pub fn update<T>(&self, f: impl FnOnce(&mut TagStore) -> T) -> Result<T> {
        let mut library = self.inner.lock();
        Ok(f(library.store_mut()?))
    }

    /// Run `f` against the loaded store with the lock held
    pub fn read<T>(&self, f: impl FnOnce(&TagStore) -> T) -> Result<T> {
        let library = self.inner.lock();
        Ok(f(library.store()?))
    }
}

impl From<TagLibrary> for SharedTagLibrary {
    fn from(library: TagLibrary) -> Self {
        Self::new(library)
    }
}
