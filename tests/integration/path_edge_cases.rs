use copyfinder::duplicates::DuplicateFinder;
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

fn create(path: &std::path::Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_paths_with_quotes() {
    // Windows does not allow double quotes in filenames.
    if cfg!(windows) {
        return;
    }
    let dir = tempdir().unwrap();
    create(&dir.path().join("file_with_\"quote\".txt"), b"content");
    create(&dir.path().join("duplicate.txt"), b"content");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert!(groups[0].files().iter().any(|f| f.name.contains('"')));
}

#[test]
fn test_paths_with_newlines() {
    // Windows does not allow newlines in filenames.
    if cfg!(windows) {
        return;
    }
    let dir = tempdir().unwrap();
    create(&dir.path().join("file_with\nnewline.txt"), b"content");
    create(&dir.path().join("duplicate.txt"), b"content");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_unicode_names() {
    let dir = tempdir().unwrap();
    create(&dir.path().join("café.txt"), b"same bytes");
    create(&dir.path().join("日本語.txt"), b"same bytes");
    create(&dir.path().join("emoji_🎉.txt"), b"other byte");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let pair = groups.iter().find(|g| g.len() == 2).unwrap();
    let mut names: Vec<_> = pair.files().iter().map(|f| f.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["café.txt", "日本語.txt"]);
}

#[test]
fn test_extremely_long_paths() {
    let dir = tempdir().unwrap();

    let mut current_path = dir.path().to_path_buf();
    let folder_name = "a".repeat(50);

    // 6 levels of 50-char folders = 300+ chars
    for i in 0..6 {
        current_path = current_path.join(format!("{}_{}", i, folder_name));
        if let Err(e) = fs::create_dir(&current_path) {
            eprintln!("Skipping extremely long path test: failed to create dir: {}", e);
            return;
        }
    }

    let file_path = current_path.join("file.txt");
    if let Err(e) = File::create(&file_path).and_then(|mut f| f.write_all(b"content")) {
        eprintln!("Skipping extremely long path test: failed to create file: {}", e);
        return;
    }
    create(&dir.path().join("duplicate.txt"), b"content");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
}

#[test]
fn test_relative_root_yields_absolute_paths() {
    let dir = tempdir().unwrap();
    create(&dir.path().join("a"), b"x");

    // A root given with a trailing `.` component still reports absolute paths
    let root = dir.path().join(".");
    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&root)
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert!(groups[0].files()[0].path.is_absolute());
    assert_eq!(groups[0].files()[0].name, "a");
}
