#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests building packs from disk and extracting them again

use ddpack_formats::pck::{ContainerLayout, PckArchive, PckError};
use ddpack_formats::resource::{PackId, ResourcePath};
use ddpack_formats::PackDescriptor;
use ddpack_storage::{
    BuildConfig, ExtractConfig, IntegrityPolicy, PackBuilder, PackExtractor, Reporter,
    SkipReason, SourceFile, StorageError, TagLibrary, TracingReporter, Warning, inspect, verify,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct Recorder {
    progress: Vec<(usize, usize)>,
    warnings: Vec<Warning>,
}

impl Reporter for Recorder {
    fn progress(&mut self, done: usize, total: usize) {
        self.progress.push((done, total));
    }

    fn warning(&mut self, warning: &Warning) {
        self.warnings.push(warning.clone());
    }
}

fn pack_id() -> PackId {
    PackId::new("ABC123").expect("id")
}

fn descriptor() -> PackDescriptor {
    let mut descriptor = PackDescriptor::new("Stone Walls", pack_id());
    descriptor.author = "tests".to_string();
    descriptor.extra.insert(
        "allow_3rd_party_mapping_software_to_read".to_string(),
        serde_json::Value::Bool(true),
    );
    descriptor
}

fn sample_files() -> BTreeMap<&'static str, Vec<u8>> {
    BTreeMap::from([
        ("textures/walls/brick.png", b"0123456789".to_vec()),
        ("textures/tilesets/cave.png", vec![0xAB; 300]),
        ("textures/objects/crates/crate.webp", vec![7; 64]),
        ("data/walls/brick.dungeondraft_wall", br#"{"path": "x"}"#.to_vec()),
        ("data/default.dungeondraft_tags", br#"{"tags": {"stone": []}}"#.to_vec()),
        ("empty.txt", Vec::new()),
    ])
}

/// Write files below `root` and list them the way a directory walker would
fn stage(root: &Path, files: &BTreeMap<&str, Vec<u8>>) -> Vec<SourceFile> {
    for (relative, data) in files {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, data).expect("write");
    }
    walk(root)
        .into_iter()
        .map(|path| SourceFile::from_path(root.join(path)).expect("source"))
        .collect()
}

/// Relative paths of all files below `root`, with `/` separators
fn walk(root: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .map(|entry| entry.expect("walk"))
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().strip_prefix(root).expect("below root").to_path_buf())
        .collect();
    paths.sort();
    paths
}

fn relative(path: &str) -> PathBuf {
    path.split('/').collect()
}

struct Fixture {
    dir: TempDir,
    pack: PathBuf,
}

fn build_pack(config: BuildConfig) -> Fixture {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().join("source");
    let sources = stage(&root, &sample_files());

    let pack = dir.path().join("stone_walls.dungeondraft_pack");
    PackBuilder::new(&root, descriptor())
        .with_config(config)
        .build(&sources, &pack, &mut TracingReporter)
        .expect("build");

    Fixture { dir, pack }
}

#[test]
fn build_then_extract_reproduces_files() {
    let fixture = build_pack(BuildConfig::default());
    let output = fixture.dir.path().join("unpacked");

    let mut recorder = Recorder::default();
    let report = PackExtractor::default()
        .extract(&fixture.pack, &output, &mut recorder)
        .expect("extract");

    assert_eq!(report.pack_id, pack_id());
    assert!(report.skipped.is_empty());
    assert!(recorder.warnings.is_empty());

    let mut expected: Vec<PathBuf> = sample_files().keys().map(|p| relative(p)).collect();
    expected.push(PathBuf::from("pack.json"));
    expected.sort();
    assert_eq!(walk(&output), expected);

    for (path, data) in sample_files() {
        assert_eq!(fs::read(output.join(relative(path))).expect("read"), data, "{path}");
    }

    let extracted = PackDescriptor::parse(&fs::read(output.join("pack.json")).expect("read"))
        .expect("descriptor");
    assert_eq!(extracted, descriptor());
}

#[test]
fn progress_is_monotonic_and_complete() {
    let fixture = build_pack(BuildConfig::default());
    let mut recorder = Recorder::default();
    PackExtractor::default()
        .extract(&fixture.pack, &fixture.dir.path().join("out"), &mut recorder)
        .expect("extract");

    let total = sample_files().len() + 1;
    let expected: Vec<_> = (1..=total).map(|done| (done, total)).collect();
    assert_eq!(recorder.progress, expected);
}

#[test]
fn two_entry_pack() {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().join("source");
    let sources = stage(
        &root,
        &BTreeMap::from([("textures/walls/brick.png", b"0123456789".to_vec())]),
    );
    let pack = dir.path().join("two.dungeondraft_pack");
    PackBuilder::new(&root, descriptor())
        .build(&sources, &pack, &mut TracingReporter)
        .expect("build");

    let inspection = inspect(&pack).expect("inspect");
    assert_eq!(inspection.directory.header.entry_count, 2);
    assert_eq!(inspection.directory.entries.len(), 2);
    assert_eq!(
        inspection.directory.entries[0].path,
        ResourcePath::descriptor(&pack_id())
    );
    let texture = &inspection.directory.entries[1];
    assert!(texture.path.is_texture() && texture.path.is_wall());
    assert_eq!(inspection.descriptor.name, "Stone Walls");

    let output = dir.path().join("out");
    PackExtractor::default()
        .extract(&pack, &output, &mut TracingReporter)
        .expect("extract");

    assert!(output.join("pack.json").is_file());
    let brick = output.join("textures").join("walls").join("brick.png");
    assert_eq!(fs::metadata(brick).expect("texture").len(), 10);
}

/// Flip one byte inside the payload of `path`
fn corrupt(pack: &Path, path: &str) {
    let offset = {
        let archive = PckArchive::open(pack).expect("archive");
        archive
            .directory()
            .find(path)
            .and_then(|e| archive.directory().payload_position(e).ok())
            .expect("entry")
    };
    let mut data = fs::read(pack).expect("read");
    data[offset as usize + 2] ^= 0x01;
    fs::write(pack, data).expect("write");
}

const BRICK: &str = "res://packs/ABC123/textures/walls/brick.png";

#[test]
fn corrupted_payload_aborts_by_default() {
    let fixture = build_pack(BuildConfig::default());
    corrupt(&fixture.pack, BRICK);

    let err = PackExtractor::default()
        .extract(&fixture.pack, &fixture.dir.path().join("out"), &mut TracingReporter)
        .expect_err("mismatch");
    assert!(err.is_integrity_error());
    match err {
        StorageError::Pck(PckError::ChecksumMismatch { path, .. }) => assert_eq!(path, BRICK),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn corrupted_payload_skipped_by_policy() {
    let fixture = build_pack(BuildConfig::default());
    corrupt(&fixture.pack, BRICK);
    let output = fixture.dir.path().join("out");

    let extractor =
        PackExtractor::new(ExtractConfig::default().with_integrity_policy(IntegrityPolicy::Skip));
    let mut recorder = Recorder::default();
    let report = extractor
        .extract(&fixture.pack, &output, &mut recorder)
        .expect("extract");

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path.as_str(), BRICK);
    assert!(matches!(
        report.skipped[0].reason,
        SkipReason::ChecksumMismatch { .. }
    ));
    assert_eq!(recorder.warnings.len(), 1);
    assert!(!output.join(relative("textures/walls/brick.png")).exists());
    assert_eq!(report.written.len(), sample_files().len());

    let verification = verify(&fixture.pack, &mut TracingReporter).expect("verify");
    assert!(!verification.is_ok());
    assert_eq!(verification.failures.len(), 1);
    assert_eq!(verification.verified, sample_files().len());
}

#[test]
fn unchecked_pack_accepts_corruption() {
    let fixture = build_pack(BuildConfig::default().with_checksums(false));
    corrupt(&fixture.pack, BRICK);
    let output = fixture.dir.path().join("out");

    let report = PackExtractor::default()
        .extract(&fixture.pack, &output, &mut TracingReporter)
        .expect("unchecked entries are accepted");
    assert!(report.skipped.is_empty());
    assert_ne!(
        fs::read(output.join(relative("textures/walls/brick.png"))).expect("read"),
        b"0123456789"
    );

    let verification = verify(&fixture.pack, &mut TracingReporter).expect("verify");
    assert!(verification.is_ok());
    assert_eq!(verification.unchecked, sample_files().len() + 1);
}

#[test]
fn truncated_pack_always_fails() {
    let fixture = build_pack(BuildConfig::default().with_checksums(false));
    let data = fs::read(&fixture.pack).expect("read");
    fs::write(&fixture.pack, &data[..data.len() - 5]).expect("truncate");

    let extractor =
        PackExtractor::new(ExtractConfig::default().with_integrity_policy(IntegrityPolicy::Skip));
    let err = extractor
        .extract(&fixture.pack, &fixture.dir.path().join("out"), &mut TracingReporter)
        .expect_err("truncated");
    assert!(matches!(
        err,
        StorageError::Pck(PckError::TruncatedRead { .. })
    ));
}

#[test]
fn self_contained_pack() {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let stub = dir.path().join("viewer.exe");
    fs::write(&stub, vec![0x4D; 4096]).expect("stub");

    let root = dir.path().join("source");
    let sources = stage(&root, &sample_files());
    let pack = dir.path().join("viewer_with_pack.exe");
    PackBuilder::new(&root, descriptor())
        .with_config(BuildConfig::default().with_executable_stub(&stub))
        .build(&sources, &pack, &mut TracingReporter)
        .expect("build");

    let data = fs::read(&pack).expect("read");
    assert_eq!(&data[..4096], &vec![0x4D; 4096][..]);
    assert_eq!(&data[data.len() - 4..], b"GDPC");

    let inspection = inspect(&pack).expect("inspect");
    assert_eq!(
        inspection.directory.layout,
        ContainerLayout::Embedded { start: 4096 }
    );

    let output = dir.path().join("out");
    let report = PackExtractor::default()
        .extract(&pack, &output, &mut TracingReporter)
        .expect("extract");
    assert_eq!(report.written.len(), sample_files().len() + 1);
}

#[test]
fn non_pack_file_is_rejected() {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("notes.txt");
    fs::write(&path, b"just some text, nothing to see").expect("write");

    let err = inspect(&path).expect_err("not a pack");
    assert!(matches!(
        err,
        StorageError::Pck(PckError::NotAContainer { .. })
    ));
}

#[test]
fn extracted_tags_are_editable() {
    let fixture = build_pack(BuildConfig::default());
    let output = fixture.dir.path().join("out");
    PackExtractor::default()
        .extract(&fixture.pack, &output, &mut TracingReporter)
        .expect("extract");

    let mut library = TagLibrary::for_pack_root(&output);
    let store = library.load().expect("load");
    assert_eq!(store.resources("stone").map(|r| r.len()), Some(0));

    library.tag("stone", [BRICK]).expect("tag");
    library.save().expect("save");

    let mut reloaded = TagLibrary::for_pack_root(&output);
    reloaded.load().expect("reload");
    assert!(reloaded.tags_for(&[BRICK]).expect("tags").contains("stone"));
}
