//! Writing new containers
//!
//! The directory precedes the payloads but checksums are only known once
//! payloads have been seen. [`PckWriter`] writes the directory up front with
//! the planned offsets, streams payloads in directory order and rewrites
//! the directory in place on [`PckWriter::finish`] when checksums were
//! computed.

use crate::pck::checksum::Checksum;
use crate::pck::directory::PckDirectory;
use crate::pck::entry::PckEntry;
use crate::pck::error::{PckError, Result};
use crate::pck::header::{EngineVersion, MAGIC_BYTES, PckHeader};
use crate::pck::layout::{assign_offsets, order_entries};
use crate::pck::locate::ContainerLayout;
use std::io::{Seek, SeekFrom, Write};

/// Streaming container writer
///
/// # Example
///
/// ```rust
/// use ddpack_formats::pck::{EngineVersion, PckEntry, PckWriter};
/// use ddpack_formats::resource::{PackId, ResourcePath};
/// use std::io::Cursor;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let id = PackId::new("ABC123")?;
/// let descriptor = br#"{"name":"Demo","id":"ABC123"}"#;
/// let texture = [0u8; 10];
///
/// let entries = vec![
///     PckEntry::new(ResourcePath::descriptor(&id), descriptor.len() as u64),
///     PckEntry::new(ResourcePath::for_pack(&id, "textures/a.png"), 10),
/// ];
///
/// let mut writer = PckWriter::new(Cursor::new(Vec::new()), EngineVersion::DEFAULT, entries, true)?;
/// writer.write_payload(descriptor)?;
/// writer.write_payload(&texture)?;
/// let bytes = writer.finish()?.into_inner();
/// assert_eq!(&bytes[..4], b"GDPC");
/// # Ok(())
/// # }
/// ```
pub struct PckWriter<W: Write + Seek> {
    inner: W,
    directory: PckDirectory,
    next: usize,
    compute_checksums: bool,
}

impl<W: Write + Seek> PckWriter<W> {
    /// Plan the layout and write header and directory
    ///
    /// Entries are sorted into authoring order (descriptor first, then by
    /// path) and offsets are assigned. Writing starts at the current stream
    /// position, so an executable stub may already have been written; the
    /// offsets then count the stub bytes too.
    pub fn new(
        mut inner: W,
        engine_version: EngineVersion,
        mut entries: Vec<PckEntry>,
        compute_checksums: bool,
    ) -> Result<Self> {
        let count = u32::try_from(entries.len()).map_err(|_| PckError::EntryCount {
            expected: u32::MAX as usize,
            actual: entries.len(),
        })?;

        let start = inner.stream_position()?;
        order_entries(&mut entries)?;
        assign_offsets(&mut entries, start + PckHeader::SIZE);

        let layout = if start == 0 {
            ContainerLayout::Bare
        } else {
            ContainerLayout::Embedded { start }
        };

        let directory = PckDirectory {
            layout,
            header: PckHeader::new(engine_version, count),
            entries,
        };
        directory.write(&mut inner)?;

        Ok(Self {
            inner,
            directory,
            next: 0,
            compute_checksums,
        })
    }

    /// Entries in the order payloads must be supplied
    pub fn entries(&self) -> &[PckEntry] {
        &self.directory.entries
    }

    /// Entry whose payload is expected next
    pub fn next_entry(&self) -> Option<&PckEntry> {
        self.directory.entries.get(self.next)
    }

    /// Number of payloads written so far
    pub fn written(&self) -> usize {
        self.next
    }

    /// Write the payload of the next entry
    pub fn write_payload(&mut self, data: &[u8]) -> Result<&PckEntry> {
        let index = self.next;
        let compute = self.compute_checksums;
        let total = self.directory.entries.len();
        let Some(entry) = self.directory.entries.get_mut(index) else {
            return Err(PckError::EntryCount {
                expected: total,
                actual: index + 1,
            });
        };

        if data.len() as u64 != entry.size {
            return Err(PckError::PayloadSize {
                path: entry.path.to_string(),
                expected: entry.size,
                actual: data.len() as u64,
            });
        }

        self.inner.write_all(data)?;
        if compute {
            entry.checksum = Checksum::compute(data);
        }

        self.next += 1;
        Ok(&self.directory.entries[index])
    }

    /// Complete the container and return the writer
    ///
    /// Fails if payloads are missing. Rewrites the directory when checksums
    /// were computed.
    pub fn finish(mut self) -> Result<W> {
        self.complete()?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    /// Complete the container and append the self-contained trailer
    ///
    /// Used when the container follows an executable stub.
    pub fn finish_embedded(mut self) -> Result<W> {
        let end = self.complete()?;
        let container_len = end - self.directory.layout.start();
        let container_len = i64::try_from(container_len).map_err(|_| {
            PckError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "container too large for trailer",
            ))
        })?;

        self.inner.write_all(&container_len.to_le_bytes())?;
        self.inner.write_all(&MAGIC_BYTES)?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    /// Decoded view of what was written
    pub fn directory(&self) -> &PckDirectory {
        &self.directory
    }

    fn complete(&mut self) -> Result<u64> {
        if self.next != self.directory.entries.len() {
            return Err(PckError::EntryCount {
                expected: self.directory.entries.len(),
                actual: self.next,
            });
        }

        let end = self.inner.stream_position()?;
        if self.compute_checksums {
            self.inner
                .seek(SeekFrom::Start(self.directory.layout.start()))?;
            self.directory.write(&mut self.inner)?;
            self.inner.seek(SeekFrom::Start(end))?;
        }
        Ok(end)
    }
}
