//! Container header plus entry directory

use crate::pck::entry::PckEntry;
use crate::pck::error::{PckError, Result};
use crate::pck::header::{MAGIC_BYTES, PckHeader};
use crate::pck::layout::directory_size;
use crate::pck::locate::{ContainerLayout, locate};
use crate::resource::{PackId, ResourcePath};
use binrw::{BinRead, BinWrite};
use std::io::{Read, Seek, Write};

/// Everything in a container except the payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PckDirectory {
    /// Where the container was found in its stream
    pub layout: ContainerLayout,
    /// Container header
    pub header: PckHeader,
    /// Directory records in on-disk order
    pub entries: Vec<PckEntry>,
}

impl PckDirectory {
    /// Locate the container in `reader` and decode header and directory
    ///
    /// # Errors
    /// Returns error if:
    /// - No container magic is found
    /// - Format or engine version is newer than supported
    /// - A record is truncated, has a negative path length or non-UTF-8 path
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let layout = locate(reader)?;

        let header = PckHeader::read(reader)?;
        header.validate()?;

        // Cap the pre-allocation; a hostile count must not exhaust memory
        let mut entries = Vec::with_capacity((header.entry_count as usize).min(4096));
        for _ in 0..header.entry_count {
            entries.push(PckEntry::read(reader).map_err(unwrap_record_error)?);
        }

        Ok(Self {
            layout,
            header,
            entries,
        })
    }

    /// Write magic, header and directory at the current position
    pub fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        let count = u32::try_from(self.entries.len()).map_err(|_| PckError::EntryCount {
            expected: u32::MAX as usize,
            actual: self.entries.len(),
        })?;
        if count != self.header.entry_count {
            return Err(PckError::EntryCount {
                expected: self.header.entry_count as usize,
                actual: self.entries.len(),
            });
        }

        writer.write_all(&MAGIC_BYTES)?;
        self.header.write(writer)?;
        for entry in &self.entries {
            entry.write(writer)?;
        }
        Ok(())
    }

    /// Encoded size of the directory records
    pub fn encoded_size(&self) -> u64 {
        directory_size(&self.entries)
    }

    /// Stream position of an entry's payload
    ///
    /// Offsets are absolute in the stream for both layouts. A payload that
    /// cannot fit in a seekable stream is reported as a truncated read.
    pub fn payload_position(&self, entry: &PckEntry) -> Result<u64> {
        entry
            .offset
            .checked_add(entry.size)
            .filter(|&end| end <= i64::MAX as u64)
            .map(|_| entry.offset)
            .ok_or_else(|| PckError::TruncatedRead {
                path: entry.path.to_string(),
                offset: entry.offset,
                expected: entry.size,
                actual: 0,
            })
    }

    /// Look up an entry by resource path
    pub fn find(&self, path: &str) -> Option<&PckEntry> {
        self.entries.iter().find(|e| e.path.as_str() == path)
    }

    /// The pack descriptor entry and the pack id it names
    pub fn descriptor(&self) -> Option<(&PckEntry, PackId)> {
        self.entries.iter().find_map(|entry| {
            let id = PackId::new(entry.path.descriptor_id()?).ok()?;
            Some((entry, id))
        })
    }

    /// Pack id taken from the descriptor entry
    pub fn pack_id(&self) -> Result<PackId> {
        self.descriptor()
            .map(|(_, id)| id)
            .ok_or(PckError::MissingDescriptor)
    }

    /// Resource paths in directory order
    pub fn paths(&self) -> impl Iterator<Item = &ResourcePath> {
        self.entries.iter().map(|e| &e.path)
    }

    /// Sum of all payload sizes
    pub fn total_payload_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }
}

/// Surface the typed error a record reader raised through binrw
fn unwrap_record_error(error: binrw::Error) -> PckError {
    match error {
        binrw::Error::Custom { pos, err } => match err.downcast::<PckError>() {
            Ok(inner) => *inner,
            Err(err) => PckError::BinRw(binrw::Error::Custom { pos, err }),
        },
        other => PckError::BinRw(other),
    }
}
