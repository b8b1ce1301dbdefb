use copyfinder::cancel::CancellationToken;
use copyfinder::duplicates::{DuplicateFinder, DuplicateGroup, FinderConfig};
use copyfinder::events::{Phase, ScanEvent, ScanOutcome};
use copyfinder::scanner::WalkerConfig;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &[u8]) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Groups as sets of file names, independent of delivery order.
fn partition(groups: &[DuplicateGroup]) -> BTreeSet<BTreeSet<String>> {
    groups
        .iter()
        .map(|g| g.files().iter().map(|f| f.name.clone()).collect())
        .collect()
}

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.buckets, 0);
}

#[test]
fn test_scan_reference_scenario() {
    let dir = tempdir().unwrap();
    write(dir.path(), "A", b"aaaaaaaaaa");
    write(dir.path(), "B", b"aaaaaaaaaa");
    write(dir.path(), "C", b"bbbbbbbbbb");
    write(dir.path(), "D", &[b'd'; 20]);

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let expected: BTreeSet<_> = [names(&["A", "B"]), names(&["C"]), names(&["D"])]
        .into_iter()
        .collect();
    assert_eq!(partition(&groups), expected);

    // Within the pair, traversal order is kept and A is the representative
    let pair = groups.iter().find(|g| g.len() == 2).unwrap();
    assert_eq!(pair.representative().name, "A");
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.reclaimable_space, 10);
}

#[test]
fn test_scan_nested_duplicates_across_directories() {
    let dir = tempdir().unwrap();
    write(dir.path(), "one/x.bin", b"payload");
    write(dir.path(), "two/deeper/y.bin", b"payload");
    write(dir.path(), "three/z.bin", b"PAYLOAD");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let expected: BTreeSet<_> = [names(&["x.bin", "y.bin"]), names(&["z.bin"])]
        .into_iter()
        .collect();
    assert_eq!(partition(&groups), expected);
    for group in &groups {
        for file in group.files() {
            assert!(file.path.is_absolute());
        }
    }
}

#[test]
fn test_scan_never_mixes_sizes() {
    let dir = tempdir().unwrap();
    write(dir.path(), "short", b"abc");
    write(dir.path(), "long", b"abcabc");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 2);
    for group in &groups {
        assert!(group.files().iter().all(|f| f.size == group.size));
    }
}

#[test]
fn test_scan_empty_files_form_one_group() {
    let dir = tempdir().unwrap();
    write(dir.path(), "e1", b"");
    write(dir.path(), "e2", b"");
    write(dir.path(), "e3", b"");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 0);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
fn test_scan_hide_singletons() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"same");
    write(dir.path(), "b", b"same");
    write(dir.path(), "c", b"diff");
    write(dir.path(), "lonely", b"only one of this size");

    let finder = DuplicateFinder::new(FinderConfig::default().with_report_singletons(false));
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(partition(&groups), [names(&["a", "b"])].into_iter().collect());
    assert_eq!(summary.groups_reported, 1);
    assert_eq!(summary.total_files, 4);
}

#[test]
fn test_scan_with_walker_filters() {
    let dir = tempdir().unwrap();
    write(dir.path(), "tiny1", b"x");
    write(dir.path(), "tiny2", b"x");
    write(dir.path(), "big1", b"big enough");
    write(dir.path(), "big2", b"big enough");
    write(dir.path(), ".hidden/big3", b"big enough");

    let walker = WalkerConfig::default()
        .with_min_size(Some(2))
        .with_skip_hidden(true);
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker));
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(partition(&groups), [names(&["big1", "big2"])].into_iter().collect());
}

#[test]
fn test_scan_is_idempotent() {
    let dir = tempdir().unwrap();
    for i in 0..12 {
        write(dir.path(), &format!("f{i:02}"), format!("class{}", i % 4).as_bytes());
    }
    let finder = DuplicateFinder::new(FinderConfig::default().with_threads(Some(4)));

    let (first, _) = finder.find_duplicates(dir.path()).unwrap();
    let (second, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
    assert!(first.iter().all(|g| g.len() == 3));
}

#[test]
fn test_scan_small_chunks_match_default_chunks() {
    let dir = tempdir().unwrap();
    let base: Vec<u8> = (0..10_000u32).map(|i| (i * 7 % 256) as u8).collect();
    let mut tweaked = base.clone();
    tweaked[9_999] ^= 0xff;
    write(dir.path(), "a", &base);
    write(dir.path(), "b", &base);
    write(dir.path(), "c", &tweaked);

    let small = DuplicateFinder::new(FinderConfig::default().with_chunk_size(97));
    let (small_groups, _) = small.find_duplicates(dir.path()).unwrap();
    let (default_groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(partition(&small_groups), partition(&default_groups));
    assert_eq!(
        partition(&small_groups),
        [names(&["a", "b"]), names(&["c"])].into_iter().collect()
    );
}

#[test]
fn test_run_reports_missing_root_as_failed() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let (tx, rx) = crossbeam_channel::unbounded();

    let report = DuplicateFinder::with_defaults().run(&missing, &CancellationToken::new(), &tx);

    assert!(matches!(report.outcome, ScanOutcome::Failed(_)));
    assert!(rx.try_recv().is_err());
    assert!(DuplicateFinder::with_defaults().find_duplicates(&missing).is_err());
}

#[test]
fn test_run_streams_one_batch_per_bucket() {
    let dir = tempdir().unwrap();
    for size in 1..=6usize {
        write(dir.path(), &format!("s{size}a"), &vec![1u8; size]);
        write(dir.path(), &format!("s{size}b"), &vec![1u8; size]);
    }
    let (tx, rx) = crossbeam_channel::unbounded();
    let finder = DuplicateFinder::new(FinderConfig::default().with_threads(Some(3)));

    let label = finder.scan(dir.path(), &CancellationToken::new(), &tx);
    assert_eq!(label, "completed");

    let events: Vec<_> = rx.try_iter().collect();
    let mut sizes: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            ScanEvent::GroupsFound { size, .. } => Some(*size),
            ScanEvent::PhaseChanged(_) => None,
        })
        .collect();
    sizes.sort_unstable();

    assert_eq!(sizes, vec![1, 2, 3, 4, 5, 6]);
    assert!(matches!(
        events.first(),
        Some(ScanEvent::PhaseChanged(Phase::TraversalComplete))
    ));
    assert!(matches!(
        events.last(),
        Some(ScanEvent::PhaseChanged(Phase::Finished(_)))
    ));
}

#[cfg(unix)]
#[test]
fn test_scan_unreadable_file_is_not_grouped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"same");
    write(dir.path(), "b", b"same");
    write(dir.path(), "locked", b"same");
    let locked = dir.path().join("locked");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores permission bits; nothing to check there
    if fs::File::open(&locked).is_ok() {
        return;
    }

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(
        partition(&groups),
        [names(&["a", "b"]), names(&["locked"])].into_iter().collect()
    );
    assert!(summary.failed_comparisons >= 1);
}
