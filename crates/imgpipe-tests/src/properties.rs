//! History and ledger invariants exercised through a session.

use crate::fixtures::{self, params};
use imgpipe_core::{ParamMap, RuntimeValue};
use imgpipe_history::{HistoryStore, ReplayMode, Session};

fn history_index(s: &Session) -> Option<usize> {
    s.timeline().history().index()
}

fn assert_aligned(s: &Session) {
    let ledger = s.timeline().ledger();
    let expected = match history_index(s) {
        Some(h) if h > 0 => Some(h - 1),
        _ => None,
    };
    assert_eq!(ledger.index(), expected);
    assert_eq!(ledger.visible_records().len(), ledger.index().map_or(0, |i| i + 1));
    assert!(ledger.visible_records().len() <= ledger.len());
}

#[test]
fn test_commits_without_undo() {
    for n in 1..6_u32 {
        let mut h = HistoryStore::new();
        for i in 0..n {
            h.commit(i);
        }
        assert_eq!(h.index(), Some(n as usize - 1));
        assert_eq!(h.len(), n as usize);
    }

    let mut s = fixtures::session();
    for _ in 0..4 {
        s.apply("Blur", ParamMap::new()).unwrap();
    }
    assert_eq!(history_index(&s), Some(4));
    assert_eq!(s.timeline().history().len(), 5);
    assert_eq!(s.timeline().ledger().len(), 4);
}

#[test]
fn test_undo_redo_restores_snapshot_identity() {
    let mut s = fixtures::session();
    s.apply("Blur", ParamMap::new()).unwrap();
    s.apply("Threshold", ParamMap::new()).unwrap();
    let before_index = history_index(&s);
    let before = s.current_image().unwrap().clone();

    s.undo().unwrap();
    s.redo().unwrap();

    assert_eq!(history_index(&s), before_index);
    assert!(s.current_image().unwrap().shares_buffer(&before));
    assert_aligned(&s);
}

#[test]
fn test_commit_after_undo_length() {
    for k in 1..4_usize {
        let mut s = fixtures::session();
        for _ in 0..k {
            s.apply("Erode", ParamMap::new()).unwrap();
        }
        assert_eq!(history_index(&s), Some(k));
        s.undo().unwrap();
        s.apply("Blur", ParamMap::new()).unwrap();
        assert_eq!(s.timeline().history().len(), k + 1);
        assert_eq!(s.timeline().ledger().len(), k);
        assert_aligned(&s);
    }
}

#[test]
fn test_export_parse_append_reproduces_ledger() {
    let mut s = fixtures::session();
    s.apply("Blur", params(&[("size", 5.into())])).unwrap();
    let shared = fixtures::TINT_MODE.member("SHARED").unwrap();
    s.apply("Tint", params(&[("mode", RuntimeValue::Enum(shared))])).unwrap();
    s.apply("Threshold", params(&[("t", 90.into())])).unwrap();
    let json = s.export_json().unwrap();

    let mut fresh = fixtures::session();
    let report = fresh.import(json.as_bytes(), ReplayMode::Append).unwrap();
    assert_eq!(report.applied, 3);

    let encodings = |s: &Session| -> Vec<_> {
        s.timeline()
            .ledger()
            .visible_records()
            .iter()
            .map(|r| (r.operation.clone(), r.parameters.clone()))
            .collect()
    };
    assert_eq!(encodings(&fresh), encodings(&s));
    assert_eq!(fresh.current_image(), s.current_image());
}

#[test]
fn test_restart_from_origin_length() {
    let mut s = fixtures::session();
    s.apply("Blur", ParamMap::new()).unwrap();
    s.apply("Erode", ParamMap::new()).unwrap();
    s.apply("Threshold", ParamMap::new()).unwrap();
    let doc = s.export();

    s.apply("Blur", ParamMap::new()).unwrap();
    s.undo();
    let report = s.replay(&doc.operations, ReplayMode::RestartFromOrigin).unwrap();
    assert_eq!(report.applied, doc.operations.len());
    assert_eq!(s.timeline().history().len(), 1 + doc.operations.len());
    assert_eq!(s.timeline().history().get(0), Some(&fixtures::origin()));
    assert_aligned(&s);
}

#[test]
fn test_unknown_operation_leaves_everything_untouched() {
    let mut s = fixtures::session();
    s.apply("Blur", ParamMap::new()).unwrap();
    s.apply("Threshold", ParamMap::new()).unwrap();
    s.undo();

    let doc = br#"{"processing_pipeline": {"functions_applied": [
        {"step": 1, "function_name": "Erode", "parameters": {"iter": 2}},
        {"step": 2, "function_name": "Blur", "parameters": {}},
        {"step": 3, "function_name": "Vignette", "parameters": {}}
    ]}}"#;

    for mode in [ReplayMode::Append, ReplayMode::RestartFromOrigin] {
        let image = s.current_image().unwrap().clone();
        let history = s.timeline().history().clone();
        let ledger = s.timeline().ledger().clone();

        assert!(s.import(doc, mode).is_err());

        assert!(s.current_image().unwrap().shares_buffer(&image));
        assert_eq!(s.timeline().history(), &history);
        assert_eq!(s.timeline().ledger(), &ledger);
        assert!(s.redo().is_some());
        s.undo();
    }
}

#[test]
fn test_visible_prefix_bound_holds_under_mixed_actions() {
    let mut s = fixtures::session();
    let script = "aauaruuuraaurrcaua";
    for action in script.chars() {
        match action {
            'a' => {
                s.apply("Blur", ParamMap::new()).unwrap();
            }
            'u' => {
                s.undo();
            }
            'r' => {
                s.redo();
            }
            'c' => s.clear_ledger(),
            _ => unreachable!(),
        }
        let ledger = s.timeline().ledger();
        assert_eq!(ledger.visible_records().len(), ledger.index().map_or(0, |i| i + 1));
        assert!(ledger.visible_records().len() <= ledger.len());
        let h = history_index(&s).unwrap();
        assert!(h < s.timeline().history().len());
    }
}
