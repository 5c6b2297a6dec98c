//! Extracting packs to a directory
//!
//! Every entry is written below the output root at its pack-relative path,
//! the descriptor as `pack.json`. Entries are handled in directory order;
//! the first entry to claim an output path wins and later ones are skipped
//! with a warning. A path is claimed both as a file and as the parent
//! directory of every file below it.

use crate::config::{ExtractConfig, IntegrityPolicy};
use crate::reporter::{Reporter, SkipReason, Warning};
use crate::{Result, StorageError};
use ddpack_formats::descriptor::PackDescriptor;
use ddpack_formats::pck::{PckArchive, PckDirectory, PckEntry, PckError};
use ddpack_formats::resource::{DESCRIPTOR_FILE_NAME, PackId, Resolved, ResourcePath};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// An entry that was not extracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Entry path
    pub path: ResourcePath,
    /// Why it was left out
    pub reason: SkipReason,
}

/// Outcome of an extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractReport {
    /// Id of the extracted pack
    pub pack_id: PackId,
    /// Files written, relative to the output root, in directory order
    pub written: Vec<PathBuf>,
    /// Entries left out
    pub skipped: Vec<SkippedEntry>,
    /// Payload bytes written
    pub bytes_written: u64,
}

/// Decoded directory and descriptor of a pack
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    /// Header, layout and entries
    pub directory: PckDirectory,
    /// Contents of the descriptor entry
    pub descriptor: PackDescriptor,
}

/// Outcome of a verification pass
#[derive(Debug, Default)]
pub struct VerifyReport {
    /// Entries whose checksum matched
    pub verified: usize,
    /// Entries stored without checksum
    pub unchecked: usize,
    /// Checksum mismatches
    pub failures: Vec<PckError>,
}

impl VerifyReport {
    /// No entry failed
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Output paths taken by entries written so far
#[derive(Debug, Default)]
struct Claims {
    files: HashMap<PathBuf, ResourcePath>,
    directories: HashMap<PathBuf, ResourcePath>,
}

impl Claims {
    /// Entry that already owns `target` or needs it to be something else
    fn conflict(&self, target: &Path) -> Option<&ResourcePath> {
        self.files
            .get(target)
            .or_else(|| self.directories.get(target))
            .or_else(|| {
                target
                    .ancestors()
                    .skip(1)
                    .find_map(|ancestor| self.files.get(ancestor))
            })
    }

    fn claim(&mut self, target: &Path, path: &ResourcePath) {
        for ancestor in target.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.directories
                .entry(ancestor.to_path_buf())
                .or_insert_with(|| path.clone());
        }
        self.files.insert(target.to_path_buf(), path.clone());
    }
}

/// Something already on disk has the wrong kind for the output path
fn is_obstructed(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::AlreadyExists | io::ErrorKind::NotADirectory | io::ErrorKind::IsADirectory
    )
}

/// Extracts packs according to an [`ExtractConfig`]
#[derive(Debug, Clone, Default)]
pub struct PackExtractor {
    config: ExtractConfig,
}

impl PackExtractor {
    /// Create an extractor
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extract the pack file at `pack` into `output`
    pub fn extract(
        &self,
        pack: &Path,
        output: &Path,
        reporter: &mut dyn Reporter,
    ) -> Result<ExtractReport> {
        info!("Extracting {} to {}", pack.display(), output.display());
        let file = BufReader::new(File::open(pack)?);
        self.extract_from(file, output, reporter)
    }

    /// Extract a pack from any seekable stream into `output`
    ///
    /// # Errors
    /// Returns error if:
    /// - The stream is not a supported container
    /// - The descriptor entry is missing, malformed or names another pack
    /// - A payload is truncated
    /// - A checksum does not match and the policy is [`IntegrityPolicy::Abort`]
    /// - Any I/O operation fails
    pub fn extract_from<R: Read + Seek>(
        &self,
        reader: R,
        output: &Path,
        reporter: &mut dyn Reporter,
    ) -> Result<ExtractReport> {
        let mut archive = PckArchive::new(reader)?;
        let pack_id = archive.pack_id()?;
        let entries = archive.entries().to_vec();
        let total = entries.len();
        debug!(
            "Pack {} has {} entries ({:?})",
            pack_id,
            total,
            archive.directory().layout
        );

        fs::create_dir_all(output)?;

        let mut report = ExtractReport {
            pack_id: pack_id.clone(),
            written: Vec::new(),
            skipped: Vec::new(),
            bytes_written: 0,
        };
        let mut claimed = Claims::default();

        for (index, entry) in entries.iter().enumerate() {
            if let Some(reason) =
                self.extract_entry(&mut archive, entry, output, &mut claimed, &mut report, reporter)?
            {
                warn!("Skipping {}: {}", entry.path, reason);
                reporter.warning(&Warning::Skipped {
                    path: entry.path.clone(),
                    reason: reason.clone(),
                });
                report.skipped.push(SkippedEntry {
                    path: entry.path.clone(),
                    reason,
                });
            }
            reporter.progress(index + 1, total);
        }

        info!(
            "Extracted pack {}: {} written, {} skipped, {} bytes",
            pack_id,
            report.written.len(),
            report.skipped.len(),
            report.bytes_written
        );
        Ok(report)
    }

    /// Extract one entry, returning why it was skipped if it was
    fn extract_entry<R: Read + Seek>(
        &self,
        archive: &mut PckArchive<R>,
        entry: &PckEntry,
        output: &Path,
        claimed: &mut Claims,
        report: &mut ExtractReport,
        reporter: &mut dyn Reporter,
    ) -> Result<Option<SkipReason>> {
        let resolved = entry.path.resolve(&report.pack_id);
        let relative = match resolved {
            Resolved::Descriptor => DESCRIPTOR_FILE_NAME,
            Resolved::Relative(relative) => relative,
            Resolved::Foreign => {
                reporter.warning(&Warning::ForeignPath {
                    path: entry.path.clone(),
                });
                entry.path.as_str()
            }
        };

        let Some(target) = safe_relative_path(relative) else {
            return Ok(Some(SkipReason::Unsafe));
        };

        if let Some(first) = claimed.conflict(&target) {
            return Ok(Some(SkipReason::Conflict {
                first: first.clone(),
                target,
            }));
        }

        let destination = output.join(&target);
        if !self.config.overwrite && destination.exists() {
            return Ok(Some(SkipReason::Exists { target }));
        }

        let read = if self.config.verify_checksums {
            archive.read_entry(entry)
        } else {
            archive.read_raw(entry)
        };
        let data = match read {
            Ok(data) => data,
            Err(PckError::ChecksumMismatch {
                expected, actual, ..
            }) if self.config.integrity == IntegrityPolicy::Skip => {
                return Ok(Some(SkipReason::ChecksumMismatch { expected, actual }));
            }
            Err(e) => return Err(e.into()),
        };

        if resolved == Resolved::Descriptor {
            PackDescriptor::parse(&data)?.expect_id(&report.pack_id)?;
        }

        let written = match destination.parent() {
            Some(parent) => fs::create_dir_all(parent),
            None => Ok(()),
        }
        .and_then(|()| fs::write(&destination, &data));
        match written {
            Ok(()) => {}
            Err(e) if is_obstructed(&e) => {
                debug!("{} is blocked on disk: {}", target.display(), e);
                return Ok(Some(SkipReason::Exists { target }));
            }
            Err(e) => return Err(e.into()),
        }
        debug!("Wrote {} ({} bytes)", target.display(), data.len());

        claimed.claim(&target, &entry.path);
        report.written.push(target);
        report.bytes_written += data.len() as u64;
        Ok(None)
    }
}

/// Map a `/` separated path to a relative filesystem path
///
/// Returns `None` for paths that are empty, absolute, contain `.` or `..`
/// segments, drive or scheme separators, or backslashes.
pub fn safe_relative_path(relative: &str) -> Option<PathBuf> {
    if relative.is_empty() {
        return None;
    }
    let mut path = PathBuf::new();
    for segment in relative.split('/') {
        if segment.is_empty()
            || segment == "."
            || segment == ".."
            || segment.contains(':')
            || segment.contains('\\')
        {
            return None;
        }
        path.push(segment);
    }
    Some(path)
}

/// Decode a pack's directory and descriptor without extracting anything
pub fn inspect(pack: &Path) -> Result<Inspection> {
    let mut archive = PckArchive::new(BufReader::new(File::open(pack)?))?;
    let pack_id = archive.pack_id()?;
    let descriptor = archive.descriptor()?;
    descriptor.expect_id(&pack_id)?;
    debug!("Inspected {}: pack {}", pack.display(), pack_id);

    Ok(Inspection {
        directory: archive.directory().clone(),
        descriptor,
    })
}

/// Check every entry of a pack against its checksum
///
/// Mismatches are collected; truncated payloads abort.
pub fn verify(pack: &Path, reporter: &mut dyn Reporter) -> Result<VerifyReport> {
    info!("Verifying {}", pack.display());
    let mut archive = PckArchive::new(BufReader::new(File::open(pack)?))?;
    let entries = archive.entries().to_vec();
    let total = entries.len();

    let mut report = VerifyReport::default();
    for (index, entry) in entries.iter().enumerate() {
        match archive.read_entry(entry) {
            Ok(_) if entry.checksum.is_unchecked() => report.unchecked += 1,
            Ok(_) => report.verified += 1,
            Err(e) if e.is_integrity_error() => {
                if let PckError::ChecksumMismatch {
                    expected, actual, ..
                } = &e
                {
                    reporter.warning(&Warning::Skipped {
                        path: entry.path.clone(),
                        reason: SkipReason::ChecksumMismatch {
                            expected: *expected,
                            actual: *actual,
                        },
                    });
                }
                report.failures.push(e);
            }
            Err(e) => return Err(StorageError::from(e)),
        }
        reporter.progress(index + 1, total);
    }

    info!(
        "Verified {}: {} ok, {} unchecked, {} failed",
        pack.display(),
        report.verified,
        report.unchecked,
        report.failures.len()
    );
    Ok(report)
}
