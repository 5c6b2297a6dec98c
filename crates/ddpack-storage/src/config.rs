//! Configuration for building and extracting packs

use crate::{Result, StorageError};
use ddpack_formats::pck::EngineVersion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What to do when an entry fails checksum verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityPolicy {
    /// Stop the extraction with an error
    #[default]
    Abort,
    /// Leave the entry out, report it and continue
    Skip,
}

/// Configuration for building a pack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Store an MD5 per entry; otherwise the all-zero checksum is written
    pub compute_checksums: bool,

    /// Engine version recorded in the header
    pub engine_version: EngineVersion,

    /// Render thumbnails for textures when a renderer is supplied
    pub generate_thumbnails: bool,

    /// Executable to prepend, producing a self-contained pack
    pub executable_stub: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            compute_checksums: true,
            engine_version: EngineVersion::DEFAULT,
            generate_thumbnails: true,
            executable_stub: None,
        }
    }
}

impl BuildConfig {
    /// Enable or disable checksums
    #[must_use]
    pub const fn with_checksums(mut self, enable: bool) -> Self {
        self.compute_checksums = enable;
        self
    }

    /// Set the engine version recorded in the header
    #[must_use]
    pub const fn with_engine_version(mut self, version: EngineVersion) -> Self {
        self.engine_version = version;
        self
    }

    /// Enable or disable thumbnail generation
    #[must_use]
    pub const fn with_thumbnails(mut self, enable: bool) -> Self {
        self.generate_thumbnails = enable;
        self
    }

    /// Prepend an executable stub
    #[must_use]
    pub fn with_executable_stub<P: AsRef<Path>>(mut self, stub: P) -> Self {
        self.executable_stub = Some(stub.as_ref().to_path_buf());
        self
    }

    /// Reject settings that would produce an unreadable container
    pub fn validate(&self) -> Result<()> {
        if !self.engine_version.is_supported() {
            return Err(StorageError::Config(format!(
                "engine version {} is newer than {}",
                self.engine_version,
                EngineVersion::MAX_SUPPORTED
            )));
        }
        if let Some(stub) = &self.executable_stub
            && !stub.is_file()
        {
            return Err(StorageError::Config(format!(
                "executable stub {} is not a file",
                stub.display()
            )));
        }
        Ok(())
    }
}

/// Configuration for extracting a pack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Compare entry payloads against their stored checksums
    pub verify_checksums: bool,

    /// Reaction to a checksum mismatch
    pub integrity: IntegrityPolicy,

    /// Replace files that already exist in the output directory
    pub overwrite: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            verify_checksums: true,
            integrity: IntegrityPolicy::Abort,
            overwrite: true,
        }
    }
}

impl ExtractConfig {
    /// Enable or disable checksum verification
    #[must_use]
    pub const fn with_verification(mut self, enable: bool) -> Self {
        self.verify_checksums = enable;
        self
    }

    /// Set the reaction to checksum mismatches
    #[must_use]
    pub const fn with_integrity_policy(mut self, policy: IntegrityPolicy) -> Self {
        self.integrity = policy;
        self
    }

    /// Allow or forbid replacing existing files
    #[must_use]
    pub const fn with_overwrite(mut self, enable: bool) -> Self {
        self.overwrite = enable;
        self
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let build = BuildConfig::default();
        assert!(build.compute_checksums);
        assert_eq!(build.engine_version, EngineVersion::DEFAULT);
        assert!(build.executable_stub.is_none());
        assert!(build.validate().is_ok());

        let extract = ExtractConfig::default();
        assert!(extract.verify_checksums);
        assert_eq!(extract.integrity, IntegrityPolicy::Abort);
        assert!(extract.overwrite);
    }

    #[test]
    fn test_validate_rejects_future_engine() {
        let config = BuildConfig::default().with_engine_version(EngineVersion::new(4, 0, 0));
        assert!(matches!(config.validate(), Err(StorageError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_missing_stub() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = BuildConfig::default().with_executable_stub(dir.path().join("missing.exe"));
        assert!(matches!(config.validate(), Err(StorageError::Config(_))));
    }

    #[test]
    fn test_partial_json() {
        let config: ExtractConfig =
            serde_json::from_str(r#"{"integrity": "skip"}"#).expect("valid config");
        assert_eq!(config.integrity, IntegrityPolicy::Skip);
        assert!(config.verify_checksums);

        let config: BuildConfig = serde_json::from_str(
            r#"{"compute_checksums": false, "engine_version": {"major": 3, "minor": 5, "patch": 1}}"#,
        )
        .expect("valid config");
        assert!(!config.compute_checksums);
        assert_eq!(config.engine_version, EngineVersion::new(3, 5, 1));
    }
}
