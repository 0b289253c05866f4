// LogInspector - tests/e2e_search.rs
//
// End-to-end tests for the search pipeline.
//
// These tests exercise real source directories in a tempdir, real walkdir
// traversal, the real worker pool, and the real JMESPath evaluator. The path
// covered runs from stream files on disk to merged LogRecords, and through
// the two-phase extract / follow-up workflow.

use chrono::{TimeZone, Utc};
use loginspector::app::inspector::{ExtractSpec, Inspector, TwoPhaseOutcome};
use loginspector::core::export;
use loginspector::core::query::JmespathEvaluator;
use loginspector::platform::file_source::FileSource;
use loginspector::util::error::InspectorError;
use std::fs;
use std::path::Path;
use std::sync::Arc;

// =============================================================================
// Helpers
// =============================================================================

const BASE_MS: i64 = 1_700_000_000_000;

fn line(offset_ms: i64, message: &str) -> String {
    serde_json::json!({"timestamp": BASE_MS + offset_ms, "message": message}).to_string()
}

/// Write `lines` as `<root>/<source>/<stream>.log`.
fn write_stream(root: &Path, source: &str, stream: &str, lines: &[String]) {
    let dir = root.join(source.trim_start_matches('/'));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{stream}.log")), lines.join("\n")).unwrap();
}

fn inspector(root: &Path, sources: &[&str], page_size: usize, concurrency: usize) -> Inspector {
    Inspector::new(
        Arc::new(FileSource::new(root, page_size)),
        Box::new(JmespathEvaluator),
        sources.iter().map(|s| s.to_string()).collect(),
        Utc.timestamp_millis_opt(BASE_MS - 60_000).unwrap(),
        Utc.timestamp_millis_opt(BASE_MS + 60_000).unwrap(),
        concurrency,
    )
}

/// Two sources: an API emitting JSON and a worker emitting plain text.
fn seed_sources(root: &Path) {
    write_stream(
        root,
        "/svc/api",
        "web-1",
        &[
            line(10, r#"{"level":"ERROR","request_id":"req-42","msg":"upstream timeout"}"#),
            line(30, r#"{"level":"INFO","request_id":"req-43","msg":"ok"}"#),
        ],
    );
    write_stream(
        root,
        "/svc/api",
        "web-2",
        &[line(20, r#"{"level":"ERROR","msg":"no request id"}"#)],
    );
    write_stream(
        root,
        "/svc/worker",
        "jobs",
        &[
            line(5, "req-42 picked up"),
            line(40, "req-42 done in 5ms"),
            line(50, "req-43 done in 2ms"),
        ],
    );
}

// =============================================================================
// Search E2E
// =============================================================================

#[test]
fn e2e_search_merges_sources_in_time_order() {
    let dir = tempfile::tempdir().unwrap();
    seed_sources(dir.path());

    let records = inspector(dir.path(), &["/svc/api", "/svc/worker"], 100, 4)
        .search("?ERROR ?done")
        .unwrap();

    let summary: Vec<(i64, &str, &str)> = records
        .iter()
        .map(|r| {
            (
                r.timestamp.timestamp_millis() - BASE_MS,
                r.source.as_str(),
                r.stream.as_str(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (10, "/svc/api", "web-1"),
            (20, "/svc/api", "web-2"),
            (40, "/svc/worker", "jobs"),
            (50, "/svc/worker", "jobs"),
        ]
    );
}

#[test]
fn e2e_page_size_and_concurrency_do_not_change_results() {
    let dir = tempfile::tempdir().unwrap();
    seed_sources(dir.path());
    let sources = ["/svc/api", "/svc/worker"];

    let baseline = inspector(dir.path(), &sources, 1_000, 1).search("req").unwrap();
    let paged = inspector(dir.path(), &sources, 1, 2).search("req").unwrap();

    assert_eq!(baseline.len(), 6);
    assert_eq!(baseline, paged);
}

#[test]
fn e2e_missing_source_fails_whole_search() {
    let dir = tempfile::tempdir().unwrap();
    seed_sources(dir.path());

    let err = inspector(dir.path(), &["/svc/api", "/svc/missing"], 100, 2)
        .search("ERROR")
        .unwrap_err();

    match err {
        InspectorError::Query { source_id, .. } => assert_eq!(source_id, "/svc/missing"),
        other => panic!("expected query error, got {other:?}"),
    }
}

#[test]
fn e2e_records_render_as_json() {
    let dir = tempfile::tempdir().unwrap();
    seed_sources(dir.path());

    let records = inspector(dir.path(), &["/svc/worker"], 100, 1)
        .search("done")
        .unwrap();
    let mut buf = Vec::new();
    export::write_json(&records, false, &mut buf).unwrap();

    let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 2);
    assert_eq!(parsed[0]["message"], "req-42 done in 5ms");
    assert_eq!(parsed[0]["stream"], "jobs");
}

// =============================================================================
// Two-phase E2E
// =============================================================================

#[test]
fn e2e_extract_only_returns_first_value() {
    let dir = tempfile::tempdir().unwrap();
    seed_sources(dir.path());

    let spec = ExtractSpec::parse("id=request_id").unwrap();
    let outcome = inspector(dir.path(), &["/svc/api"], 100, 2)
        .two_phase("ERROR", &spec, None)
        .unwrap();

    assert_eq!(outcome, TwoPhaseOutcome::Extracted("req-42".to_string()));
}

#[test]
fn e2e_follow_up_with_literal_template() {
    let dir = tempfile::tempdir().unwrap();
    seed_sources(dir.path());

    // `"req-42" done` is not a valid expression, so it is used as the filter.
    let spec = ExtractSpec::parse("id=request_id").unwrap();
    let outcome = inspector(dir.path(), &["/svc/api", "/svc/worker"], 100, 2)
        .two_phase("ERROR", &spec, Some("{{id}} done"))
        .unwrap();

    match outcome {
        TwoPhaseOutcome::Followed {
            value,
            filter,
            records,
        } => {
            assert_eq!(value, "req-42");
            assert_eq!(filter, r#""req-42" done"#);
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].message, "req-42 done in 5ms");
        }
        other => panic!("expected follow-up, got {other:?}"),
    }
}

#[test]
fn e2e_follow_up_with_evaluated_template() {
    let dir = tempfile::tempdir().unwrap();
    seed_sources(dir.path());

    let spec = ExtractSpec::parse("id=request_id").unwrap();
    let outcome = inspector(dir.path(), &["/svc/worker"], 100, 1)
        .two_phase("ERROR", &spec, Some("value"))
        .unwrap();

    // The first search only covers the worker, which has no JSON messages.
    assert_eq!(outcome, TwoPhaseOutcome::NoRecords);

    let outcome = inspector(dir.path(), &["/svc/api", "/svc/worker"], 100, 2)
        .two_phase("ERROR", &spec, Some("value"))
        .unwrap();
    match outcome {
        TwoPhaseOutcome::Followed { filter, records, .. } => {
            assert_eq!(filter, "req-42");
            let messages: Vec<&str> = records.iter().map(|r| r.message.as_str()).collect();
            assert_eq!(messages.len(), 3);
            assert!(messages.contains(&"req-42 picked up"));
            assert!(messages.contains(&"req-42 done in 5ms"));
        }
        other => panic!("expected follow-up, got {other:?}"),
    }
}

#[test]
fn e2e_no_extractable_value() {
    let dir = tempfile::tempdir().unwrap();
    seed_sources(dir.path());

    let spec = ExtractSpec::parse("trace=trace_id").unwrap();
    let outcome = inspector(dir.path(), &["/svc/api"], 100, 2)
        .two_phase("ERROR", &spec, Some("{{trace}}"))
        .unwrap();

    assert_eq!(outcome, TwoPhaseOutcome::NotFound);
}
