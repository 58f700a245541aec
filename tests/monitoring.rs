//! Monitoring-registry scenarios that span multiple calls, as opposed to
//! the single-call unit tests living alongside `store::monitor`.

use std::fs;

use fhd::Store;
use tempfile::tempdir;

#[test]
fn ignored_patterns_survive_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.fhd");

    {
        let mut store = Store::open(&path).unwrap();
        store.ignore(&["*.tmp".to_string(), "*.bak".to_string()]).unwrap();
        store.close().unwrap();
    }

    let store = Store::open(&path).unwrap();
    let patterns = store.ignored_patterns().unwrap();
    assert!(patterns.iter().any(|p| p == "*.tmp"));
    assert!(patterns.iter().any(|p| p == "*.bak"));
}

#[test]
fn unignore_removes_a_custom_pattern_but_not_the_protected_one() {
    let dir = tempdir().unwrap();
    let mut store = Store::open(dir.path().join("history.fhd")).unwrap();
    store.ignore(&["*.log".to_string()]).unwrap();

    store
        .unignore(&["*.log".to_string(), "*.fhd".to_string()])
        .unwrap();

    let patterns = store.ignored_patterns().unwrap();
    assert!(!patterns.iter().any(|p| p == "*.log"));
    assert!(patterns.iter().any(|p| p == "*.fhd"));
}

#[test]
fn unmonitoring_a_known_file_keeps_its_history_queryable() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"will be retired after one save").unwrap();
    let mut store = Store::open(dir.path().join("history.fhd")).unwrap();
    let result = store.monitor_with_comment("first", &["a.txt".to_string()]).unwrap();

    store.unmonitor(&["a.txt".to_string()]).unwrap();

    let state = store.state_for_filename("a.txt").unwrap();
    assert!(!state.monitored);
    assert_eq!(state.sid, result.sid);

    let mut out = Vec::new();
    store.extract("a.txt", &mut out).unwrap();
    assert_eq!(out, b"will be retired after one save");
}

#[test]
fn re_monitoring_an_unmonitored_file_resumes_saving_it() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"paused for a while").unwrap();
    let mut store = Store::open(dir.path().join("history.fhd")).unwrap();
    store.monitor_with_comment("first", &["a.txt".to_string()]).unwrap();
    store.unmonitor(&["a.txt".to_string()]).unwrap();

    fs::write(dir.path().join("a.txt"), b"resumed with new content, long enough").unwrap();
    let resumed = store
        .monitor_with_comment("resumed", &["a.txt".to_string()])
        .unwrap();

    assert!(resumed.sid.is_valid());
    assert!(store.state_for_filename("a.txt").unwrap().monitored);
}
