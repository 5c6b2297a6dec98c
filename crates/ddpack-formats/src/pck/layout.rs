//! Offset assignment for freshly authored containers
//!
//! Payloads are stored back to back right after the directory, in
//! directory order, with no padding:
//!
//! ```text
//! offset[0] = start + directory_size
//! offset[i] = offset[i - 1] + size[i - 1]
//! ```

use crate::pck::entry::PckEntry;
use crate::pck::error::{PckError, Result};
use crate::resource::ResourceKind;
use std::collections::HashSet;

/// Encoded size of all directory records
pub fn directory_size(entries: &[PckEntry]) -> u64 {
    entries.iter().map(PckEntry::record_size).sum()
}

/// Assign payload offsets as a running sum
///
/// `start` is the number of bytes before the directory: the stub length
/// plus [`PckHeader::SIZE`](crate::pck::PckHeader::SIZE). Returns the offset one
/// past the last payload, i.e. the container length. Running this twice on
/// the same entries gives the same offsets.
pub fn assign_offsets(entries: &mut [PckEntry], start: u64) -> u64 {
    let mut offset = start + directory_size(entries);
    for entry in entries.iter_mut() {
        entry.offset = offset;
        offset += entry.size;
    }
    offset
}

/// Sort entries into authoring order
///
/// The pack descriptor goes first, everything else follows in byte order of
/// the path. Duplicate paths are rejected.
pub fn order_entries(entries: &mut [PckEntry]) -> Result<()> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries.iter() {
        if !seen.insert(entry.path.as_str()) {
            return Err(PckError::DuplicatePath(entry.path.to_string()));
        }
    }

    entries.sort_by(|a, b| {
        let a_descriptor = a.path.kind() == ResourceKind::Descriptor;
        let b_descriptor = b.path.kind() == ResourceKind::Descriptor;
        b_descriptor
            .cmp(&a_descriptor)
            .then_with(|| a.path.as_str().as_bytes().cmp(b.path.as_str().as_bytes()))
    });

    Ok(())
}
