use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use dupematch::actions::{DeleteExecutor, DeleteMode, Side};
use dupematch::matching::{BuildError, BuilderConfig, MatchBuilder};
use dupematch::review::MatchSet;
use dupematch::scanner::WalkOptions;

fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn builder() -> MatchBuilder {
    MatchBuilder::new(WalkOptions::default())
}

#[test]
fn test_single_root_finds_content_equal_pair() {
    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "a.txt", b"hello");
    let b = write_file(&dir, "b.txt", b"hello");
    write_file(&dir, "c.txt", b"world");

    let outcome = builder().build_single_root(dir.path()).unwrap();

    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].file1, a);
    assert_eq!(outcome.matches[0].file2, b);
    assert!(!outcome.matches[0].is_image);
    assert_eq!(outcome.stats.scanned_files, 3);
    assert_eq!(outcome.stats.hashed_files, 3);
    assert_eq!(outcome.error_count(), 0);
}

#[test]
fn test_single_root_group_of_three_pairs_against_first() {
    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "a.bin", b"same");
    let b = write_file(&dir, "b.bin", b"same");
    let c = write_file(&dir, "c.bin", b"same");

    let outcome = builder().build_single_root(dir.path()).unwrap();

    assert_eq!(outcome.matches.len(), 2);
    assert_eq!(outcome.matches[0].file1, a);
    assert_eq!(outcome.matches[0].file2, b);
    assert_eq!(outcome.matches[1].file1, a);
    assert_eq!(outcome.matches[1].file2, c);
}

#[test]
fn test_dual_root_first_match_wins_and_image_flag() {
    let dir1 = TempDir::new().unwrap();
    let dir2 = TempDir::new().unwrap();

    let x = write_file(&dir1, "x.png", b"pixels");
    let y = write_file(&dir2, "y.png", b"pixels");
    write_file(&dir2, "z.png", b"pixels");

    let outcome = builder().build_dual_root(dir1.path(), dir2.path()).unwrap();

    // z.png also matches on content, but only the first bucket member pairs
    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].file1, x);
    assert_eq!(outcome.matches[0].file2, y);
    assert!(outcome.matches[0].is_image);
}

#[test]
fn test_dual_root_no_cross_content_matches() {
    let dir1 = TempDir::new().unwrap();
    let dir2 = TempDir::new().unwrap();

    write_file(&dir1, "a.txt", b"one");
    write_file(&dir2, "b.txt", b"two");

    let outcome = builder().build_dual_root(dir1.path(), dir2.path()).unwrap();
    assert!(outcome.matches.is_empty());
}

#[test]
fn test_empty_root_yields_empty_outcome() {
    let dir = TempDir::new().unwrap();

    let outcome = builder().build_single_root(dir.path()).unwrap();
    assert!(outcome.matches.is_empty());
    assert_eq!(outcome.stats.scanned_files, 0);
    assert_eq!(outcome.error_count(), 0);
}

#[test]
fn test_empty_files_are_matched() {
    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "empty1", b"");
    let b = write_file(&dir, "empty2", b"");

    let outcome = builder().build_single_root(dir.path()).unwrap();
    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].file1, a);
    assert_eq!(outcome.matches[0].file2, b);
}

#[test]
fn test_repeated_scans_are_identical() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "nested/deep/a.txt", b"dup");
    write_file(&dir, "b.txt", b"dup");
    write_file(&dir, "nested/c.txt", b"dup");

    let first = builder().build_single_root(dir.path()).unwrap();
    let second = builder().build_single_root(dir.path()).unwrap();

    assert_eq!(first.matches, second.matches);
    assert_eq!(first.stats, second.stats);
}

#[test]
fn test_non_recursive_ignores_nested_duplicates() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "a.txt", b"dup");
    write_file(&dir, "nested/b.txt", b"dup");

    let options = WalkOptions {
        recursive: false,
        ..Default::default()
    };
    let outcome = MatchBuilder::new(options)
        .build_single_root(dir.path())
        .unwrap();

    assert!(outcome.matches.is_empty());
    assert_eq!(outcome.stats.scanned_files, 1);
}

#[test]
fn test_ignore_patterns_exclude_candidates() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "a.txt", b"dup");
    write_file(&dir, "b.txt", b"dup");
    write_file(&dir, "c.tmp", b"dup");

    let options = WalkOptions {
        ignore_patterns: vec!["*.tmp".to_string()],
        ..Default::default()
    };
    let outcome = MatchBuilder::new(options)
        .build_single_root(dir.path())
        .unwrap();

    assert_eq!(outcome.stats.scanned_files, 2);
    assert_eq!(outcome.matches.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped_not_fatal() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "a.txt", b"dup");
    let b = write_file(&dir, "b.txt", b"dup");
    let locked = write_file(&dir, "locked.txt", b"secret");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Permission bits are not enforced for privileged users
    if fs::read(&locked).is_ok() {
        return;
    }

    let outcome = builder().build_single_root(dir.path()).unwrap();

    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].file1, a);
    assert_eq!(outcome.matches[0].file2, b);

    assert_eq!(outcome.error_count(), 1);
    assert_eq!(outcome.skipped[0].path, locked);
    assert_eq!(outcome.stats.scanned_files, 3);
    assert_eq!(outcome.stats.hashed_files, 2);
    assert_eq!(outcome.stats.skipped_files, 1);
}

#[test]
fn test_missing_root_fails_before_scanning() {
    let err = builder()
        .build_single_root(std::path::Path::new("/no/such/root/404"))
        .unwrap_err();
    assert!(matches!(err, BuildError::RootNotFound(_)));
}

#[test]
fn test_preset_shutdown_flag_interrupts_scan() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "a.txt", b"dup");
    write_file(&dir, "b.txt", b"dup");

    let flag = Arc::new(AtomicBool::new(false));
    flag.store(true, Ordering::SeqCst);

    let config = BuilderConfig::default().with_shutdown_flag(flag);
    let err = MatchBuilder::new(WalkOptions::default())
        .with_config(config)
        .build_single_root(dir.path())
        .unwrap_err();

    assert!(matches!(err, BuildError::Interrupted));
}

#[test]
fn test_scan_then_bulk_delete_second_side() {
    let dir1 = TempDir::new().unwrap();
    let dir2 = TempDir::new().unwrap();

    let keep1 = write_file(&dir1, "a.txt", b"dup-a");
    let keep2 = write_file(&dir1, "b.txt", b"dup-b");
    let gone1 = write_file(&dir2, "a-copy.txt", b"dup-a");
    let gone2 = write_file(&dir2, "b-copy.txt", b"dup-b");
    let unrelated = write_file(&dir2, "other.txt", b"unrelated");

    let outcome = builder().build_dual_root(dir1.path(), dir2.path()).unwrap();
    assert_eq!(outcome.matches.len(), 2);

    let mut set = MatchSet::new(outcome.matches);
    let summary = DeleteExecutor::new(DeleteMode::Permanent).delete_all_on_side(&mut set, Side::Second);

    assert_eq!(summary.deleted, 2);
    assert!(summary.all_succeeded());
    assert!(set.is_empty());

    assert!(keep1.exists());
    assert!(keep2.exists());
    assert!(unrelated.exists());
    assert!(!gone1.exists());
    assert!(!gone2.exists());
}
