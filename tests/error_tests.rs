use copyfinder::duplicates::{DuplicateFinder, FinderError};
use copyfinder::scanner::ScanError;
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_scan_non_existent_path() {
    let finder = DuplicateFinder::with_defaults();
    let result = finder.find_duplicates(std::path::Path::new("/non/existent/path/12345"));

    match result {
        Err(FinderError::Scan(ScanError::NotFound(path))) => {
            assert!(path.to_string_lossy().contains("non/existent/path/12345"));
        }
        _ => panic!("Expected NotFound error, got {:?}", result),
    }
}

#[test]
fn test_scan_file_instead_of_directory() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("file.txt");
    File::create(&file_path).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let result = finder.find_duplicates(&file_path);

    match result {
        Err(FinderError::Scan(ScanError::NotADirectory(path))) => {
            assert!(path.to_string_lossy().contains("file.txt"));
        }
        _ => panic!("Expected NotADirectory error, got {:?}", result),
    }
}

#[cfg(unix)]
#[test]
fn test_permission_denied_continues() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempdir().unwrap();
    let sub = dir.path().join("no_access");
    fs::create_dir(&sub).unwrap();
    File::create(sub.join("hidden.txt"))
        .unwrap()
        .write_all(b"public")
        .unwrap();

    fs::set_permissions(&sub, fs::Permissions::from_mode(0o000)).unwrap();

    File::create(dir.path().join("ok1.txt"))
        .unwrap()
        .write_all(b"public")
        .unwrap();
    File::create(dir.path().join("ok2.txt"))
        .unwrap()
        .write_all(b"public")
        .unwrap();

    // Root ignores permission bits
    let locked = fs::read_dir(&sub).is_err();

    let finder = DuplicateFinder::with_defaults();
    let result = finder.find_duplicates(dir.path());
    fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();

    let (groups, summary) = result.unwrap();
    if locked {
        assert_eq!(summary.total_files, 2);
        assert_eq!(summary.skipped_entries, 1);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_root_fails() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempdir().unwrap();
    let root = dir.path().join("locked_root");
    fs::create_dir(&root).unwrap();
    fs::set_permissions(&root, fs::Permissions::from_mode(0o000)).unwrap();

    let locked = fs::read_dir(&root).is_err();
    let result = DuplicateFinder::with_defaults().find_duplicates(&root);
    fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();

    if locked {
        assert!(matches!(
            result,
            Err(FinderError::Scan(ScanError::PermissionDenied(_)))
        ));
    }
}

#[test]
fn test_file_disappearing_before_compare() {
    use copyfinder::cancel::CancellationToken;
    use copyfinder::duplicates::{cluster_bucket, Comparator, SizeBucket};
    use copyfinder::scanner::FileDescriptor;

    let dir = tempdir().unwrap();
    let keep = dir.path().join("keep.txt");
    let gone = dir.path().join("gone.txt");
    fs::write(&keep, b"12345").unwrap();
    fs::write(&gone, b"12345").unwrap();

    let bucket = SizeBucket::with_files(
        5,
        vec![
            FileDescriptor::new(keep.clone(), 5),
            FileDescriptor::new(gone.clone(), 5),
        ],
    );
    fs::remove_file(&gone).unwrap();

    let token = CancellationToken::new();
    let mut comparator = Comparator::new(1024, token.clone());
    let outcome = cluster_bucket(bucket, &mut comparator, &token);

    assert_eq!(outcome.groups.len(), 2);
    assert_eq!(comparator.failures(), 1);
}

#[cfg(target_os = "linux")]
#[test]
fn test_invalid_utf8_path() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir().unwrap();
    let invalid_name = OsStr::from_bytes(b"invalid_\xff_name.txt");
    if fs::write(dir.path().join(invalid_name), b"content").is_err() {
        return;
    }
    fs::write(dir.path().join("valid.txt"), b"content").unwrap();

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert!(groups[0].files().iter().any(|f| f.name.contains('\u{FFFD}')));
}
