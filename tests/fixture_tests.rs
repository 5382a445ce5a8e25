//! Scenario fixture tests for clearmot-rs.
//!
//! Each fixture describes a short sequence of frames and the CLEAR-MOT counts
//! and metrics expected after accumulating it.
//!
//! Run with: cargo test fixture

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use clearmot_rs::{BoxAnnotation, EvalConfig, Frame, MotAccumulator, MotMetrics};

// ============================================================================
// Fixture JSON Schema
// ============================================================================

#[derive(Debug, Deserialize)]
struct Fixture {
    #[allow(dead_code)]
    description: String,
    config: EvalConfig,
    frames: Vec<FrameJson>,
    expected: Expected,
}

/// Boxes are `[id, x, y, width, height]`.
#[derive(Debug, Deserialize)]
struct FrameJson {
    frame: i64,
    ground_truth: Vec<(i64, f64, f64, f64, f64)>,
    hypotheses: Vec<(i64, f64, f64, f64, f64)>,
}

#[derive(Debug, Deserialize)]
struct Expected {
    num_objects: u64,
    num_matches: u64,
    num_false_positives: u64,
    num_misses: u64,
    num_switches: u64,
    num_fragmentations: u64,
    mostly_tracked: u64,
    partially_tracked: u64,
    mostly_lost: u64,
    mota: Option<f64>,
    motp: Option<f64>,
    precision: Option<f64>,
    recall: Option<f64>,
}

// ============================================================================
// Test Helpers
// ============================================================================

fn find_testdata_dir() -> PathBuf {
    // Try various locations relative to where tests run
    let candidates = [
        PathBuf::from("testdata/fixtures"),
        PathBuf::from("../testdata/fixtures"),
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/fixtures")),
    ];

    for candidate in &candidates {
        if candidate.exists() {
            return candidate.clone();
        }
    }
    panic!("Could not find testdata/fixtures directory");
}

fn load_fixture(scenario: &str) -> Fixture {
    let testdata_dir = find_testdata_dir();
    let path = testdata_dir.join(format!("fixture_{}.json", scenario));

    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture file {:?}: {}", path, e));

    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture file {:?}: {}", path, e))
}

fn to_boxes(frame: i64, boxes: &[(i64, f64, f64, f64, f64)]) -> Vec<BoxAnnotation> {
    boxes
        .iter()
        .map(|&(id, x, y, w, h)| BoxAnnotation::new(id, frame, x, y, w, h))
        .collect()
}

fn compare_metric(scenario: &str, name: &str, expected: Option<f64>, actual: Option<f64>) {
    match (expected, actual) {
        (Some(e), Some(a)) => assert!(
            (e - a).abs() < 1e-9,
            "{}: {} mismatch: expected {}, got {}",
            scenario,
            name,
            e,
            a
        ),
        (None, None) => {}
        _ => panic!(
            "{}: {} mismatch: expected {:?}, got {:?}",
            scenario, name, expected, actual
        ),
    }
}

// ============================================================================
// Fixture Test Runner
// ============================================================================

fn run_fixture_test(scenario: &str) {
    let fixture = load_fixture(scenario);
    fixture.config.validate().expect("fixture config must be valid");

    let mut acc = MotAccumulator::new(fixture.config.clone());
    for frame in &fixture.frames {
        let frame_data = Frame::new(
            frame.frame,
            to_boxes(frame.frame, &frame.ground_truth),
            to_boxes(frame.frame, &frame.hypotheses),
        )
        .unwrap_or_else(|e| panic!("{}: invalid frame {}: {}", scenario, frame.frame, e));

        acc.update_frame(&frame_data)
            .unwrap_or_else(|e| panic!("{}: update failed at frame {}: {}", scenario, frame.frame, e));
    }

    let totals = acc.finalize();
    let metrics = MotMetrics::from_totals(&totals);
    let exp = &fixture.expected;

    let counts = [
        ("num_objects", exp.num_objects, totals.num_objects),
        ("num_matches", exp.num_matches, totals.num_matches),
        ("num_false_positives", exp.num_false_positives, totals.num_false_positives),
        ("num_misses", exp.num_misses, totals.num_misses),
        ("num_switches", exp.num_switches, totals.num_switches),
        ("num_fragmentations", exp.num_fragmentations, totals.num_fragmentations),
        ("mostly_tracked", exp.mostly_tracked, totals.mostly_tracked),
        ("partially_tracked", exp.partially_tracked, totals.partially_tracked),
        ("mostly_lost", exp.mostly_lost, totals.mostly_lost),
    ];
    for (name, expected, actual) in counts {
        assert_eq!(expected, actual, "{}: {} mismatch", scenario, name);
    }

    compare_metric(scenario, "mota", exp.mota, metrics.mota);
    compare_metric(scenario, "motp", exp.motp, metrics.motp);
    compare_metric(scenario, "precision", exp.precision, metrics.precision);
    compare_metric(scenario, "recall", exp.recall, metrics.recall);

    println!(
        "Fixture test '{}' passed: {} frames verified",
        scenario,
        fixture.frames.len()
    );
}

// ============================================================================
// Test Cases
// ============================================================================

#[test]
fn test_fixture_id_switch() {
    run_fixture_test("id_switch");
}

#[test]
fn test_fixture_fragmentation() {
    run_fixture_test("fragmentation");
}

#[test]
fn test_fixture_continuity() {
    run_fixture_test("continuity");
}

#[test]
fn test_fixture_euclidean_threshold() {
    run_fixture_test("euclidean_threshold");
}

#[test]
fn test_fixture_total_miss() {
    run_fixture_test("total_miss");
}
