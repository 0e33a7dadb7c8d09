//! Integration tests for zip-bruteforce
//!
//! Archives are built on the fly with the `zip` writer (legacy ZipCrypto
//! encryption) inside temporary directories.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::tempdir;
use zip::unstable::write::FileOptionsExt;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};
use zip_bruteforce::archive::{ArchiveTarget, Verifier, VerifierFactory};
use zip_bruteforce::error::ConfigError;
use zip_bruteforce::search::{search, Keyspace, SearchCoordinator, SearchOutcome, SearchProgress};
use zip_bruteforce::SearchConfig;

/// (name, contents, password) of one archive member
type Member = (&'static str, &'static [u8], Option<&'static str>);

/// Long and repetitive enough that deflate actually compresses it
const PROSE: &[u8] = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
    Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
    Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. \
    Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.";

fn write_archive(path: &Path, members: &[Member]) {
    write_archive_with(path, members, CompressionMethod::Stored);
}

fn write_archive_with(path: &Path, members: &[Member], method: CompressionMethod) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);

    for &(name, contents, password) in members {
        let mut options = SimpleFileOptions::default().compression_method(method);
        if let Some(password) = password {
            options = options.with_deprecated_encryption(password.as_bytes());
        }
        writer.start_file(name, options).unwrap();
        writer.write_all(contents).unwrap();
    }

    writer.finish().unwrap();
}

fn encrypted_archive(dir: &Path, password: &'static str) -> PathBuf {
    let path = dir.join("secret.zip");
    let members: [Member; 1] = [(
        "secret.txt",
        b"the quick brown fox jumps over the lazy dog",
        Some(password),
    )];
    write_archive(&path, &members);
    path
}

fn deflated_archive(dir: &Path, password: &'static str) -> PathBuf {
    let path = dir.join("deflated.zip");
    let members: [Member; 1] = [("notes.txt", PROSE, Some(password))];
    write_archive_with(&path, &members, CompressionMethod::Deflated);
    path
}

fn config(archive: &Path, alphabet: &str, length: usize, workers: usize) -> SearchConfig {
    SearchConfig::new(archive, Keyspace::new(alphabet, length).unwrap())
        .with_workers(workers)
        .with_batch_size(4)
        .with_report_interval(Duration::from_millis(20))
        .with_grace_period(Duration::from_secs(2))
}

#[test]
fn test_recovers_password_end_to_end() {
    let dir = tempdir().unwrap();
    let archive = encrypted_archive(dir.path(), "101");
    let output = dir.path().join("password.txt");

    let target = ArchiveTarget::inspect(&archive).unwrap();
    let cfg = config(&archive, "01", 3, 2).with_output(&output);

    let report = SearchCoordinator::new(cfg, target)
        .run(|_: &SearchProgress| {})
        .unwrap();

    let found = report.discovery().unwrap();
    assert_eq!(found.password, "101");
    assert!(report.attempts <= 8);
    assert_eq!(fs::read_to_string(&output).unwrap().trim(), "101");
}

#[test]
fn test_search_helper_returns_password() {
    let dir = tempdir().unwrap();
    let archive = encrypted_archive(dir.path(), "ab7");

    let target = ArchiveTarget::inspect(&archive).unwrap();
    let found = search(config(&archive, "ab0123456789", 3, 4), target)
        .unwrap()
        .unwrap();

    assert_eq!(found.password, "ab7");
}

#[test]
fn test_exhausts_when_password_outside_alphabet() {
    let dir = tempdir().unwrap();
    let archive = encrypted_archive(dir.path(), "zz");
    let output = dir.path().join("password.txt");

    let target = ArchiveTarget::inspect(&archive).unwrap();
    let cfg = config(&archive, "0123456789", 2, 3).with_output(&output);

    let report = SearchCoordinator::new(cfg, target)
        .run(|_: &SearchProgress| {})
        .unwrap();

    assert_eq!(report.outcome, SearchOutcome::Exhausted);
    assert_eq!(report.attempts, 100);
    assert_eq!(report.attempts, report.keyspace_size);
    assert!(!report.is_partial());
    assert!(!output.exists());
}

#[test]
fn test_missing_archive_is_config_error() {
    let dir = tempdir().unwrap();
    let result = ArchiveTarget::inspect(dir.path().join("nope.zip"));
    assert!(matches!(result, Err(ConfigError::ArchiveNotFound { .. })));
}

#[test]
fn test_non_zip_is_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.zip");
    fs::write(&path, "this is not a zip archive").unwrap();

    let result = ArchiveTarget::inspect(&path);
    assert!(matches!(result, Err(ConfigError::InvalidArchive { .. })));
}

#[test]
fn test_empty_archive_is_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.zip");
    write_archive(&path, &[]);

    let result = ArchiveTarget::inspect(&path);
    assert!(matches!(result, Err(ConfigError::EmptyArchive { .. })));
}

#[test]
fn test_unencrypted_archive_is_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plain.zip");
    let members: [Member; 1] = [("plain.txt", b"hello", None)];
    write_archive(&path, &members);

    let result = ArchiveTarget::inspect(&path);
    assert!(matches!(result, Err(ConfigError::NotEncrypted { .. })));
}

#[test]
fn test_selects_smallest_encrypted_member() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mixed.zip");
    let members: [Member; 4] = [
        ("large.bin", &[7u8; 4096], Some("pw")),
        ("tiny-plain.txt", b"x", None),
        ("small.txt", b"small contents", Some("pw")),
        ("medium.txt", &[1u8; 512], Some("pw")),
    ];
    write_archive(&path, &members);

    let target = ArchiveTarget::inspect(&path).unwrap();
    assert_eq!(target.member().name, "small.txt");
    assert_eq!(target.member().index, 2);
    assert_eq!(target.member_count(), 4);
}

#[test]
fn test_zip_verifier_accepts_only_the_password() {
    let dir = tempdir().unwrap();
    let archive = encrypted_archive(dir.path(), "s3cret");

    let target = ArchiveTarget::inspect(&archive).unwrap();
    let mut verifier = target.open(0).unwrap();

    assert!(verifier.verify(b"s3cret").unwrap());
    for wrong in ["", "secret", "s3cre", "s3cret!", "S3CRET"] {
        assert!(!verifier.verify(wrong.as_bytes()).unwrap(), "{wrong}");
    }
    // Still usable after rejections
    assert!(verifier.verify(b"s3cret").unwrap());
}

#[test]
fn test_zip_verifier_rejects_large_wrong_range() {
    // Enough wrong candidates that some pass the one-byte header check;
    // the CRC check must still reject all of them
    let dir = tempdir().unwrap();
    let archive = encrypted_archive(dir.path(), "9999");

    let target = ArchiveTarget::inspect(&archive).unwrap();
    let mut verifier = target.open(0).unwrap();

    let keyspace = Keyspace::new("0123456789", 3).unwrap();
    let partitions = zip_bruteforce::search::Partitioner::partition(&keyspace, 1);
    for candidate in partitions[0].candidates() {
        assert!(!verifier.verify(candidate.as_bytes()).unwrap(), "{candidate}");
    }
}

#[test]
fn test_deflated_member_rejects_wrong_range() {
    // Wrong keys that pass the header check feed garbage to the inflater;
    // those must come back as mismatches, not errors or matches
    let dir = tempdir().unwrap();
    let archive = deflated_archive(dir.path(), "x9x9");

    let target = ArchiveTarget::inspect(&archive).unwrap();
    let mut verifier = target.open(0).unwrap();

    let keyspace = Keyspace::new("0123456789", 4).unwrap();
    let partitions = zip_bruteforce::search::Partitioner::partition(&keyspace, 1);
    let mut false_positives = Vec::new();
    for candidate in partitions[0].candidates() {
        if verifier.verify(candidate.as_bytes()).unwrap() {
            false_positives.push(candidate);
        }
    }

    assert!(false_positives.is_empty(), "{:?}", false_positives);
    assert!(verifier.verify(b"x9x9").unwrap());
}

#[test]
fn test_recovers_password_from_deflated_member() {
    let dir = tempdir().unwrap();
    let archive = deflated_archive(dir.path(), "7a3");
    let output = dir.path().join("password.txt");

    let target = ArchiveTarget::inspect(&archive).unwrap();
    let cfg = config(&archive, "0123456789abc", 3, 5).with_output(&output);

    let report = SearchCoordinator::new(cfg, target)
        .run(|_: &SearchProgress| {})
        .unwrap();

    assert_eq!(report.discovery().unwrap().password, "7a3");
    assert_eq!(report.abandoned_workers, 0);
    assert_eq!(fs::read_to_string(&output).unwrap(), "7a3\n");
}
