//! End-to-end session scenarios.

use crate::fixtures::{self, params};
use imgpipe_core::{Image, ParamMap};
use imgpipe_history::document;
use imgpipe_history::{
    EncodedValue, EnumResolution, ImportError, PipelineError, ReplayError, ReplayMode,
    SessionConfig, SessionManager,
};
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_undo_then_fork_drops_threshold() {
    let mut s = fixtures::session();
    s.apply("Blur", params(&[("size", 5.into())])).unwrap();
    s.apply("Threshold", params(&[("t", 127.into())])).unwrap();

    s.undo().unwrap();
    assert_eq!(s.timeline().ledger().index(), Some(0));

    s.apply("Erode", params(&[("iter", 1.into())])).unwrap();
    assert_eq!(s.timeline().history().index(), Some(2));
    assert_eq!(s.timeline().history().len(), 3);

    let names: Vec<_> = s
        .timeline()
        .ledger()
        .records()
        .iter()
        .map(|r| r.operation.as_str())
        .collect();
    assert_eq!(names, vec!["Blur", "Erode"]);

    let doc = s.export();
    assert_eq!(doc.total_steps, 2);
    assert_eq!(doc.current_step, 2);
    let exported: Vec<_> = doc.operations.iter().map(|r| r.operation.as_str()).collect();
    assert_eq!(exported, vec!["Blur", "Erode"]);
    assert_eq!(doc.operations[1].step, 2);
    assert_eq!(doc.operations[0].parameters["size"], EncodedValue::Int(5));
}

#[test]
fn test_unknown_second_entry_rolls_back() {
    let mut s = fixtures::session();
    let before = s.timeline().history().clone();

    let json = br#"{"processing_pipeline": {"total_steps": 2, "current_step": 2, "functions_applied": [
        {"step": 1, "function_name": "Blur", "parameters": {"size": 5}, "timestamp": "2024-05-01T10:00:00"},
        {"step": 2, "function_name": "Sepia", "parameters": {}, "timestamp": "2024-05-01T10:00:01"}
    ]}, "export_timestamp": "2024-05-01T10:00:02"}"#;

    let err = s.import(json, ReplayMode::Append).unwrap_err();
    match err {
        PipelineError::Replay(ReplayError::UnknownOperation { name, step }) => {
            assert_eq!(name, "Sepia");
            assert_eq!(step, 2);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(s.timeline().history(), &before);
    assert!(s.timeline().ledger().is_empty());
    assert_eq!(s.current_image(), Some(&fixtures::origin()));
}

#[test]
fn test_failing_operation_mid_replay_rolls_back() {
    let mut s = fixtures::session();
    s.apply("Blur", ParamMap::new()).unwrap();
    let before = s.timeline().ledger().clone();

    let json = br#"{"processing_pipeline": {"functions_applied": [
        {"function_name": "Erode", "parameters": {}},
        {"function_name": "Explode", "parameters": {}}
    ]}}"#;
    let err = s.import(json, ReplayMode::RestartFromOrigin).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Replay(ReplayError::OperationFailed { step: 2, .. })
    ));
    assert_eq!(s.timeline().ledger(), &before);
    assert_eq!(s.timeline().history().len(), 2);
}

#[test]
fn test_schema_resolution_picks_declared_enum() {
    let json = br#"{"processing_pipeline": {"functions_applied": [
        {"function_name": "Tint", "parameters": {"mode": "SHARED"}}
    ]}}"#;

    let mut schema = fixtures::session();
    schema.import(json, ReplayMode::Append).unwrap();
    assert!(schema.current_image().unwrap().data().iter().all(|&v| v == 90));

    // Trial matching resolves SHARED against EdgeMode first, which Tint rejects.
    let mut trial = fixtures::session_with(SessionConfig {
        enum_resolution: EnumResolution::TrialMatch,
        ..SessionConfig::default()
    });
    let err = trial.import(json, ReplayMode::Append).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Replay(ReplayError::OperationFailed { .. })
    ));
    assert!(trial.timeline().ledger().is_empty());
}

#[test]
fn test_out_of_range_import_reports_failure() {
    let mut s = fixtures::builtin_session();
    s.apply("Invert", ParamMap::new()).unwrap();
    let image = s.current_image().unwrap().clone();
    let history = s.timeline().history().clone();
    let ledger = s.timeline().ledger().clone();

    let documents: [&[u8]; 2] = [
        br#"{"processing_pipeline": {"functions_applied": [
            {"function_name": "Resize", "parameters": {"fx": 1e18, "fy": 1.0}}]}}"#,
        br#"{"processing_pipeline": {"functions_applied": [
            {"function_name": "Gaussian Blur", "parameters": {"ksize": 1000000000000000001}}]}}"#,
    ];
    for bytes in documents {
        for mode in [ReplayMode::Append, ReplayMode::RestartFromOrigin] {
            let err = s.import(bytes, mode).unwrap_err();
            assert!(matches!(
                err,
                PipelineError::Replay(ReplayError::OperationFailed { step: 1, .. })
            ));
            assert!(s.current_image().unwrap().shares_buffer(&image));
            assert_eq!(s.timeline().history(), &history);
            assert_eq!(s.timeline().ledger(), &ledger);
        }
    }
}

#[test]
fn test_preview_accept_flow() {
    let mut s = fixtures::session();
    let preview = s.preview("Threshold", ParamMap::new()).unwrap();
    assert_eq!(preview.base_index, Some(0));
    assert_eq!(s.timeline().history().len(), 1);

    let kept = preview.image.clone();
    s.accept(preview).unwrap();
    assert!(s.current_image().unwrap().shares_buffer(&kept));

    let stale = s.preview("Blur", ParamMap::new()).unwrap();
    s.undo();
    assert!(matches!(s.accept(stale), Err(PipelineError::StalePreview)));
    assert_eq!(s.timeline().history().len(), 2);
    assert_eq!(s.timeline().history().index(), Some(0));
}

#[test]
fn test_failed_apply_leaves_session_unchanged() {
    let mut s = fixtures::session();
    s.apply("Blur", ParamMap::new()).unwrap();
    let history = s.timeline().history().clone();
    let ledger = s.timeline().ledger().clone();

    assert!(matches!(
        s.apply("Explode", ParamMap::new()),
        Err(PipelineError::Operation { .. })
    ));
    assert!(matches!(
        s.apply("Blur", params(&[("size", 4.into())])),
        Err(PipelineError::Operation { .. })
    ));
    assert_eq!(s.timeline().history(), &history);
    assert_eq!(s.timeline().ledger(), &ledger);
}

#[test]
fn test_empty_export_is_sentinel() {
    let s = fixtures::session();
    let json = s.export_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["processing_pipeline"]["total_steps"], 0);
    assert_eq!(value["processing_pipeline"]["note"], document::EMPTY_HISTORY_NOTE);

    let parsed = document::parse(json.as_bytes()).unwrap();
    assert!(parsed.is_empty_history());
}

#[test]
fn test_invalid_documents_rejected_before_replay() {
    let mut s = fixtures::session();
    let cases: [(&[u8], fn(&ImportError) -> bool); 3] = [
        (b"nope", |e| matches!(e, ImportError::MalformedJson(_))),
        (br#"{"processing_pipeline": {}}"#, |e| {
            matches!(e, ImportError::SchemaViolation { .. })
        }),
        (
            br#"{"processing_pipeline": {"functions_applied": [{"function_name": "Blur"}]}}"#,
            |e| matches!(e, ImportError::MissingField { index: 0, .. }),
        ),
    ];
    for (bytes, check) in cases {
        match s.import(bytes, ReplayMode::Append) {
            Err(PipelineError::Import(e)) => assert!(check(&e), "{e}"),
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(s.timeline().history().len(), 1);
}

#[test]
fn test_file_roundtrip_with_builtin_ops() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pipeline.json");

    let mut s = fixtures::builtin_session();
    s.apply("Gaussian Blur", ParamMap::new()).unwrap();
    s.apply("Box Blur", params(&[("ksize", (5_i64, 5_i64).into())])).unwrap();
    s.apply("Threshold", ParamMap::new()).unwrap();
    s.apply("Dilate", ParamMap::new()).unwrap();
    s.undo();
    std::fs::write(&path, s.export_json().unwrap()).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let doc = document::parse(&bytes).unwrap();
    assert_eq!(doc.total_steps, 3);
    assert_eq!(
        doc.operations[0].parameters["borderType"],
        EncodedValue::Text("BORDER_DEFAULT".into())
    );

    let mut other = fixtures::builtin_session();
    other.import(&bytes, ReplayMode::Append).unwrap();
    assert_eq!(other.current_image(), s.current_image());
    assert_eq!(other.timeline().history().len(), 4);
}

#[test]
fn test_blend_second_image_is_not_replayable() {
    let mut s = fixtures::builtin_session();
    let overlay = Image::filled(24, 16, 3, 255).unwrap();
    s.apply("Blend", params(&[("overlay", overlay.into())])).unwrap();
    let doc = s.export();
    assert_eq!(
        doc.operations[0].parameters["overlay"],
        EncodedValue::Text("Image(24x16x3)".into())
    );

    let mut other = fixtures::builtin_session();
    let err = other.replay(&doc.operations, ReplayMode::Append).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Replay(ReplayError::OperationFailed { step: 1, .. })
    ));
}

#[test]
fn test_manager_sessions_in_parallel() {
    let manager = Arc::new(SessionManager::new(fixtures::registry(), SessionConfig::default()));
    let ids: Vec<_> = (0..3).map(|_| manager.create()).collect();

    let handles: Vec<_> = ids
        .iter()
        .enumerate()
        .map(|(n, &id)| {
            let manager = Arc::clone(&manager);
            std::thread::spawn(move || {
                manager
                    .with_session(id, |s| {
                        s.load_source(fixtures::origin());
                        for _ in 0..=n {
                            s.apply("Blur", ParamMap::new()).map(|_| ())?;
                        }
                        s.export_json()
                    })
                    .unwrap()
                    .unwrap()
            })
        })
        .collect();
    let exports: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for (n, json) in exports.iter().enumerate() {
        assert_eq!(document::parse(json.as_bytes()).unwrap().total_steps, n + 1);
    }
    assert!(manager.close(ids[0]));
    assert_eq!(manager.len(), 2);
}
