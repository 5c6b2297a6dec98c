//! Locating the container inside a stream
//!
//! A container either starts at byte 0 or is appended to a self-contained
//! executable. In the latter case the file ends with a trailer:
//!
//! ```text
//! [executable][container ...][container_len: i64][GDPC]
//!                                                 ^ EOF - 4
//! ```
//!
//! The candidate positions are probed in a fixed order, see [`PROBE_ORDER`].

use crate::pck::error::{PckError, Result};
use crate::pck::header::{MAGIC_BYTES, PckHeader};
use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// Size of the self-contained trailer (length + magic)
pub const TRAILER_SIZE: u64 = 8 + 4;

/// Physical layout of a located container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerLayout {
    /// Container starts at byte 0
    Bare,
    /// Container appended to an executable
    Embedded {
        /// Stream position of the container magic
        start: u64,
    },
}

impl ContainerLayout {
    /// Stream position of the container magic
    pub fn start(&self) -> u64 {
        match self {
            Self::Bare => 0,
            Self::Embedded { start } => *start,
        }
    }

    /// Whether this is the self-contained executable variant
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded { .. })
    }
}

/// Candidate magic positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Byte 0
    Start,
    /// `EOF - 4`, the trailer magic
    Trailer,
    /// Position computed from the trailer's length field
    Embedded,
}

/// Order in which candidates are tried
pub const PROBE_ORDER: [Probe; 3] = [Probe::Start, Probe::Trailer, Probe::Embedded];

/// Find the container magic and leave the cursor right after it
///
/// Arbitrary input is expected here: anything that is not a container
/// yields [`PckError::NotAContainer`].
pub fn locate<R: Read + Seek>(reader: &mut R) -> Result<ContainerLayout> {
    let stream_len = reader.seek(SeekFrom::End(0))?;
    let mut embedded_start: Option<u64> = None;
    let mut failures: Vec<String> = Vec::new();

    for probe in PROBE_ORDER {
        let position = match probe {
            Probe::Start => 0,
            Probe::Trailer => {
                let Some(position) = stream_len.checked_sub(4) else {
                    failures.push(format!("stream too short ({stream_len} bytes)"));
                    break;
                };
                position
            }
            Probe::Embedded => match embedded_start {
                Some(position) => position,
                None => break,
            },
        };

        let matched = magic_at(reader, position)?;

        match (probe, matched) {
            (Probe::Start, true) => return Ok(ContainerLayout::Bare),
            (Probe::Start, false) => failures.push("no magic at start".to_string()),
            (Probe::Trailer, true) => match embedded_position(reader, stream_len)? {
                Ok(start) => embedded_start = Some(start),
                Err(reason) => {
                    failures.push(reason);
                    break;
                }
            },
            (Probe::Trailer, false) => {
                failures.push("no magic at end of stream".to_string());
                break;
            }
            (Probe::Embedded, true) => {
                return Ok(ContainerLayout::Embedded { start: position });
            }
            (Probe::Embedded, false) => {
                failures.push(format!("no magic at trailer target {position}"));
            }
        }
    }

    Err(PckError::NotAContainer {
        reason: failures.join("; "),
    })
}

/// Seek to `position` and compare four bytes against the magic
///
/// Running off the end of the stream is a mismatch, not an error.
fn magic_at<R: Read + Seek>(reader: &mut R, position: u64) -> Result<bool> {
    reader.seek(SeekFrom::Start(position))?;
    let mut magic = [0u8; 4];
    match reader.read_exact(&mut magic) {
        Ok(()) => Ok(magic == MAGIC_BYTES),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Read the trailer length and compute where the container should start
///
/// The inner `Err` is a reason the trailer is unusable.
fn embedded_position<R: Read + Seek>(
    reader: &mut R,
    stream_len: u64,
) -> Result<std::result::Result<u64, String>> {
    if stream_len < TRAILER_SIZE {
        return Ok(Err(format!("stream too short for trailer ({stream_len} bytes)")));
    }

    reader.seek(SeekFrom::Start(stream_len - TRAILER_SIZE))?;
    let mut raw = [0u8; 8];
    reader.read_exact(&mut raw)?;
    let container_len = i64::from_le_bytes(raw);

    // Cursor now sits on the trailer magic
    let current = stream_len - 4;
    let start = u64::try_from(container_len)
        .ok()
        .and_then(|len| current.checked_sub(len))
        .and_then(|pos| pos.checked_sub(8));

    match start {
        Some(start) if start + PckHeader::SIZE <= stream_len - TRAILER_SIZE => Ok(Ok(start)),
        _ => Ok(Err(format!(
            "trailer length {container_len} does not fit a {stream_len} byte stream"
        ))),
    }
}
