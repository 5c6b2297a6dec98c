//! Directory records

use crate::pck::checksum::Checksum;
use crate::pck::error::PckError;
use crate::resource::ResourcePath;
use binrw::{BinRead, BinResult, BinWrite};
use std::io::{Read, Seek, Write};

/// Size of the fixed part of a record (offset, size, checksum)
pub const FIXED_RECORD_SIZE: u64 = 8 + 8 + 16;

/// One file stored in a container
///
/// Record layout, little-endian:
/// - Path length (4 bytes, signed)
/// - Path bytes (UTF-8, forward slashes, no terminator)
/// - Offset from the start of the stream (8 bytes)
/// - Size (8 bytes)
/// - MD5 checksum (16 bytes, zero when unchecked)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PckEntry {
    /// Internal resource path
    pub path: ResourcePath,
    /// Absolute payload offset in the stream
    pub offset: u64,
    /// Payload size in bytes
    pub size: u64,
    /// Payload checksum
    pub checksum: Checksum,
}

impl PckEntry {
    /// Create an entry whose offset is assigned later
    pub fn new(path: ResourcePath, size: u64) -> Self {
        Self {
            path,
            offset: 0,
            size,
            checksum: Checksum::UNCHECKED,
        }
    }

    /// Encoded size of this record in the directory
    pub fn record_size(&self) -> u64 {
        4 + self.path.as_str().len() as u64 + FIXED_RECORD_SIZE
    }

    /// Offset one past the last payload byte
    pub fn end_offset(&self) -> u64 {
        self.offset.saturating_add(self.size)
    }
}

fn custom_error(pos: u64, err: PckError) -> binrw::Error {
    binrw::Error::Custom {
        pos,
        err: Box::new(err),
    }
}

impl BinRead for PckEntry {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let record_pos = reader.stream_position()?;

        let length = i32::read_options(reader, endian, ())?;
        if length < 0 {
            return Err(custom_error(
                record_pos,
                PckError::NegativePathLength {
                    length,
                    offset: record_pos,
                },
            ));
        }

        // Bounded read; a corrupt length must not allocate gigabytes up front
        let mut path_bytes = Vec::new();
        reader
            .by_ref()
            .take(length as u64)
            .read_to_end(&mut path_bytes)?;
        if path_bytes.len() != length as usize {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }

        // Godot's packer pads paths to 4 bytes with NULs inside the length
        while path_bytes.last() == Some(&0) {
            path_bytes.pop();
        }

        let path = String::from_utf8(path_bytes)
            .map_err(|_| custom_error(record_pos, PckError::InvalidPath { offset: record_pos }))?;

        let offset = u64::read_options(reader, endian, ())?;
        let size = u64::read_options(reader, endian, ())?;
        let checksum = Checksum::read_options(reader, endian, ())?;

        Ok(Self {
            path: ResourcePath::new(path),
            offset,
            size,
            checksum,
        })
    }
}

impl BinWrite for PckEntry {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: binrw::Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        let path = self.path.as_str().as_bytes();
        let length = i32::try_from(path.len()).map_err(|_| binrw::Error::AssertFail {
            pos: writer.stream_position().unwrap_or(0),
            message: format!("path too long: {} bytes", path.len()),
        })?;

        length.write_options(writer, endian, ())?;
        writer.write_all(path)?;
        self.offset.write_options(writer, endian, ())?;
        self.size.write_options(writer, endian, ())?;
        self.checksum.write_options(writer, endian, ())?;

        Ok(())
    }
}

impl binrw::meta::ReadEndian for PckEntry {
    const ENDIAN: binrw::meta::EndianKind = binrw::meta::EndianKind::Endian(binrw::Endian::Little);
}

impl binrw::meta::WriteEndian for PckEntry {
    const ENDIAN: binrw::meta::EndianKind = binrw::meta::EndianKind::Endian(binrw::Endian::Little);
}
