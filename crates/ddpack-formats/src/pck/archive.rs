//! Reading payloads from a decoded container

use crate::descriptor::PackDescriptor;
use crate::pck::directory::PckDirectory;
use crate::pck::entry::PckEntry;
use crate::pck::error::{PckError, Result};
use crate::resource::PackId;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// A container stream together with its decoded directory
pub struct PckArchive<R: Read + Seek> {
    reader: R,
    directory: PckDirectory,
}

impl<R: Read + Seek> PckArchive<R> {
    /// Locate and decode the container in `reader`
    pub fn new(mut reader: R) -> Result<Self> {
        let directory = PckDirectory::read(&mut reader)?;
        Ok(Self { reader, directory })
    }

    /// Decoded header and directory
    pub fn directory(&self) -> &PckDirectory {
        &self.directory
    }

    /// Directory records in on-disk order
    pub fn entries(&self) -> &[PckEntry] {
        &self.directory.entries
    }

    /// Pack id named by the descriptor entry
    pub fn pack_id(&self) -> Result<PackId> {
        self.directory.pack_id()
    }

    /// Read an entry's payload without checksum verification
    ///
    /// A short read is always an error.
    pub fn read_raw(&mut self, entry: &PckEntry) -> Result<Vec<u8>> {
        let position = self.directory.payload_position(entry)?;
        let size = usize::try_from(entry.size).map_err(|_| PckError::TruncatedRead {
            path: entry.path.to_string(),
            offset: position,
            expected: entry.size,
            actual: 0,
        })?;

        self.reader.seek(SeekFrom::Start(position))?;
        let mut data = Vec::with_capacity(size.min(64 * 1024 * 1024));
        (&mut self.reader).take(entry.size).read_to_end(&mut data)?;

        if data.len() != size {
            return Err(PckError::TruncatedRead {
                path: entry.path.to_string(),
                offset: position,
                expected: entry.size,
                actual: data.len() as u64,
            });
        }

        Ok(data)
    }

    /// Read an entry's payload and verify its checksum
    ///
    /// Entries with the all-zero checksum are accepted as-is.
    pub fn read_entry(&mut self, entry: &PckEntry) -> Result<Vec<u8>> {
        let data = self.read_raw(entry)?;
        entry
            .checksum
            .verify(&data)
            .map_err(|actual| PckError::ChecksumMismatch {
                path: entry.path.to_string(),
                expected: entry.checksum,
                actual,
            })?;
        Ok(data)
    }

    /// Read an entry by resource path
    pub fn read_path(&mut self, path: &str) -> Result<Option<Vec<u8>>> {
        let Some(entry) = self.directory.find(path).cloned() else {
            return Ok(None);
        };
        self.read_entry(&entry).map(Some)
    }

    /// Read and parse the pack descriptor
    pub fn descriptor(&mut self) -> Result<PackDescriptor> {
        let (entry, _) = self
            .directory
            .descriptor()
            .ok_or(PckError::MissingDescriptor)?;
        let entry = entry.clone();
        let data = self.read_entry(&entry)?;
        Ok(PackDescriptor::parse(&data)?)
    }

    /// Verify every entry, collecting checksum mismatches instead of stopping
    ///
    /// Truncated reads and I/O failures still abort.
    pub fn verify_all(&mut self) -> Result<Vec<PckError>> {
        let entries = self.directory.entries.clone();
        let mut failures = Vec::new();
        for entry in &entries {
            match self.read_entry(entry) {
                Ok(_) => {}
                Err(e) if e.is_integrity_error() => failures.push(e),
                Err(e) => return Err(e),
            }
        }
        Ok(failures)
    }

    /// Give back the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl PckArchive<File> {
    /// Open a container file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(file)
    }
}
