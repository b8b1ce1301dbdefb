use copyfinder::controller::{ScanController, StartOutcome};
use copyfinder::duplicates::FinderConfig;
use copyfinder::events::{Phase, ScanEvent, ScanOutcome};
use crossbeam_channel::Receiver;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

fn drain_session(rx: &Receiver<ScanEvent>) -> Vec<ScanEvent> {
    let mut events = Vec::new();
    loop {
        let event = rx
            .recv_timeout(Duration::from_secs(60))
            .expect("session should finish");
        let finished = matches!(event, ScanEvent::PhaseChanged(Phase::Finished(_)));
        events.push(event);
        if finished {
            return events;
        }
    }
}

#[test]
fn test_controller_full_session() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("A"), b"aaaaaaaaaa").unwrap();
    fs::write(dir.path().join("B"), b"aaaaaaaaaa").unwrap();
    fs::write(dir.path().join("C"), b"bbbbbbbbbb").unwrap();
    fs::write(dir.path().join("D"), [0u8; 20]).unwrap();

    let (controller, rx) = ScanController::new(FinderConfig::default());
    let outcome = controller.start(&dir.path().to_string_lossy()).unwrap();
    assert_eq!(outcome, StartOutcome::Started);

    let events = drain_session(&rx);

    // TraversalComplete precedes every batch
    assert!(matches!(
        events[0],
        ScanEvent::PhaseChanged(Phase::TraversalComplete)
    ));

    let mut batches: Vec<(u64, usize)> = events
        .iter()
        .filter_map(|e| match e {
            ScanEvent::GroupsFound { size, groups } => Some((*size, groups.len())),
            ScanEvent::PhaseChanged(_) => None,
        })
        .collect();
    batches.sort_unstable();
    assert_eq!(batches, vec![(10, 2), (20, 1)]);

    match events.last() {
        Some(ScanEvent::PhaseChanged(Phase::Finished(report))) => {
            assert!(matches!(report.outcome, ScanOutcome::Completed));
            assert_eq!(report.summary.total_files, 4);
        }
        other => panic!("Expected Finished, got {:?}", other),
    }
}

#[test]
fn test_controller_cancel_many_buckets() {
    let dir = tempdir().unwrap();
    for size in 1..=300usize {
        fs::write(dir.path().join(format!("a{size:03}")), vec![7u8; size * 64]).unwrap();
        fs::write(dir.path().join(format!("b{size:03}")), vec![7u8; size * 64]).unwrap();
    }

    let config = FinderConfig::default()
        .with_threads(Some(1))
        .with_chunk_size(8);
    let (controller, rx) = ScanController::new(config);
    controller.start(&dir.path().to_string_lossy()).unwrap();

    // Wait for clustering to begin, then cancel
    let first = rx.recv_timeout(Duration::from_secs(60)).unwrap();
    assert!(matches!(
        first,
        ScanEvent::PhaseChanged(Phase::TraversalComplete)
    ));
    controller.cancel();

    let events = drain_session(&rx);
    let batches = events
        .iter()
        .filter(|e| matches!(e, ScanEvent::GroupsFound { .. }))
        .count();
    match events.last() {
        Some(ScanEvent::PhaseChanged(Phase::Finished(report))) => {
            if matches!(report.outcome, ScanOutcome::Cancelled) {
                assert!(batches < 300);
                assert!(report.summary.interrupted);
            }
        }
        other => panic!("Expected Finished, got {:?}", other),
    }

    // Nothing follows Finished
    controller.wait();
    assert!(rx.try_recv().is_err());
    assert!(!controller.is_running());
}

#[test]
fn test_controller_sequential_sessions_share_receiver() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    fs::write(first.path().join("x"), b"1").unwrap();
    fs::write(second.path().join("y"), b"22").unwrap();
    fs::write(second.path().join("z"), b"22").unwrap();

    let (controller, rx) = ScanController::new(FinderConfig::default());

    controller.start(&first.path().to_string_lossy()).unwrap();
    let one = drain_session(&rx);
    controller.start(&second.path().to_string_lossy()).unwrap();
    let two = drain_session(&rx);

    let group_sizes = |events: &[ScanEvent]| -> Vec<usize> {
        events
            .iter()
            .filter_map(|e| match e {
                ScanEvent::GroupsFound { groups, .. } => Some(groups[0].len()),
                ScanEvent::PhaseChanged(_) => None,
            })
            .collect()
    };
    assert_eq!(group_sizes(&one), vec![1]);
    assert_eq!(group_sizes(&two), vec![2]);
}
