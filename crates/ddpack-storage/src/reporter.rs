//! Progress and warning delivery
//!
//! Long operations call [`Reporter::progress`] after every entry and
//! [`Reporter::warning`] for every entry they pass through or leave out.
//! Neither call can stop the operation.

use ddpack_formats::pck::Checksum;
use ddpack_formats::resource::ResourcePath;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Why an entry was not extracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// An earlier entry already resolved to the same file
    Conflict {
        /// Path of the entry that was written
        first: ResourcePath,
        /// Shared output file, relative to the output root
        target: PathBuf,
    },
    /// Path would escape the output root or is not a valid file name
    Unsafe,
    /// Output file exists and overwriting is disabled, or something on
    /// disk blocks the path
    Exists {
        /// Existing file
        target: PathBuf,
    },
    /// Payload does not match its stored checksum
    ChecksumMismatch {
        /// Checksum stored in the directory
        expected: Checksum,
        /// Checksum of the payload
        actual: Checksum,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { first, target } => {
                write!(f, "{} already written by {first}", target.display())
            }
            Self::Unsafe => f.write_str("unsafe output path"),
            Self::Exists { target } => write!(f, "{} already exists", target.display()),
            Self::ChecksumMismatch { expected, actual } => {
                write!(f, "checksum mismatch: expected {expected}, got {actual}")
            }
        }
    }
}

/// Something the caller should see that did not stop the operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Entry path does not belong to the pack and was used verbatim
    ForeignPath {
        /// Entry path
        path: ResourcePath,
    },
    /// Entry was left out
    Skipped {
        /// Entry path
        path: ResourcePath,
        /// Why
        reason: SkipReason,
    },
    /// Renderer produced no thumbnail for a texture
    NoThumbnail {
        /// Texture path
        path: ResourcePath,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForeignPath { path } => write!(f, "{path}: not part of this pack, kept as is"),
            Self::Skipped { path, reason } => write!(f, "{path}: skipped, {reason}"),
            Self::NoThumbnail { path } => write!(f, "{path}: no thumbnail rendered"),
        }
    }
}

/// Receiver for progress and warnings of a single operation
pub trait Reporter {
    /// `done` of `total` entries have been handled
    fn progress(&mut self, done: usize, total: usize) {
        let _ = (done, total);
    }

    /// An entry needs the caller's attention
    fn warning(&mut self, warning: &Warning) {
        let _ = warning;
    }
}

/// Reporter that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn progress(&mut self, done: usize, total: usize) {
        debug!("Progress {}/{}", done, total);
    }

    fn warning(&mut self, warning: &Warning) {
        warn!("{}", warning);
    }
}

/// Reporter forwarding progress to a closure
///
/// Warnings are logged.
pub struct FnReporter<F: FnMut(usize, usize)> {
    on_progress: F,
}

impl<F: FnMut(usize, usize)> FnReporter<F> {
    /// Wrap a progress callback
    pub fn new(on_progress: F) -> Self {
        Self { on_progress }
    }
}

impl<F: FnMut(usize, usize)> Reporter for FnReporter<F> {
    fn progress(&mut self, done: usize, total: usize) {
        (self.on_progress)(done, total);
    }

    fn warning(&mut self, warning: &Warning) {
        warn!("{}", warning);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_reporter_forwards_progress() {
        let mut seen = Vec::new();
        {
            let mut reporter = FnReporter::new(|done, total| seen.push((done, total)));
            reporter.progress(1, 2);
            reporter.warning(&Warning::ForeignPath {
                path: ResourcePath::new("textures/a.png"),
            });
            reporter.progress(2, 2);
        }
        assert_eq!(seen, vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn test_warning_display() {
        let warning = Warning::Skipped {
            path: ResourcePath::new("res://packs/A1/textures/a.png"),
            reason: SkipReason::Conflict {
                first: ResourcePath::new("res://packs/A1/textures//a.png"),
                target: PathBuf::from("textures/a.png"),
            },
        };
        let text = warning.to_string();
        assert!(text.starts_with("res://packs/A1/textures/a.png: skipped"));
        assert!(text.contains("already written by res://packs/A1/textures//a.png"));
    }
}
