//! End-to-end pipeline tests over scripted fixtures.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use codemedic::analyzer::Analyzer;
use codemedic::compare;
use codemedic::config::Config;
use codemedic::history::HistoryStore;
use codemedic::loader::ScriptUnit;
use codemedic::runner::{self, TestStatus};

/// The instrumentation session is process-global; pipeline tests serialize
/// on this lock.
static PROFILE_LOCK: Mutex<()> = Mutex::new(());

const MIXED: &str = r#"
function test_ok() {
    var total = 0;
    for (var i = 0; i < 200000; i++) {
        total += i % 7;
    }
    return total;
}

function test_fail() {
    throw new Error("x");
}

function helper() {
    return 1;
}
"#;

const PASSING: &str = r#"
function test_first() {
    var words = [];
    for (var i = 0; i < 5000; i++) {
        words.push("item" + i);
    }
    return words.length;
}

function test_second() {
    return "ok";
}
"#;

fn write_fixture(dir: &tempfile::TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).unwrap();
    path
}

fn test_config(dir: &tempfile::TempDir) -> Config {
    Config {
        // Closed port: the collaborator call fails fast and gets embedded.
        ollama_url: "http://127.0.0.1:9/api/generate".to_string(),
        ollama_model: "dolphin3".to_string(),
        profiling_timeout: Duration::from_secs(2),
        history_file: dir.path().join("history.json").display().to_string(),
    }
}

#[test]
fn discovery_returns_exactly_the_test_callables_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "mixed.js", MIXED);
    let unit = ScriptUnit::load(&path).unwrap();

    let outcomes = runner::execute(&unit);
    assert_eq!(outcomes.len(), 2);

    assert_eq!(outcomes[0].name, "test_ok");
    assert_eq!(outcomes[0].status, TestStatus::Passed);
    assert_eq!(outcomes[0].detail, None);

    assert_eq!(outcomes[1].name, "test_fail");
    assert_eq!(outcomes[1].status, TestStatus::Failed);
    let detail = outcomes[1].detail.as_deref().unwrap();
    assert!(detail.contains('x'), "detail: {detail}");
}

#[test]
fn discovery_is_order_stable_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "mixed.js", MIXED);

    let first: Vec<String> = runner::execute(&ScriptUnit::load(&path).unwrap())
        .into_iter()
        .map(|o| o.name)
        .collect();
    let second: Vec<String> = runner::execute(&ScriptUnit::load(&path).unwrap())
        .into_iter()
        .map(|o| o.name)
        .collect();
    assert_eq!(first, second);
}

#[test]
fn profiled_record_has_valid_metrics_and_overall_status() {
    let _lock = PROFILE_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "mixed.js", MIXED);

    let record = codemedic::profile_test_file(&path).unwrap();
    assert_eq!(record.test_file, path.display().to_string());
    assert!(record.execution_time >= 0.0);
    assert!(record.memory_usage.peak >= 0.0);
    assert_eq!(record.overall_status(), TestStatus::Failed);
    assert!(record.test_output_text().contains("Test test_ok passed"));
    assert!(record.test_output_text().contains("Test test_fail failed:"));
}

#[test]
fn comparison_isolates_candidates_from_each_other() {
    let _lock = PROFILE_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let dir = tempfile::tempdir().unwrap();
    let path_a = write_fixture(&dir, "passing.js", PASSING);
    let missing = dir.path().join("missing.js");

    let solo: Vec<(String, TestStatus)> = compare::profile_candidate(&path_a)
        .outcomes
        .iter()
        .map(|o| (o.name.clone(), o.status))
        .collect();

    let comparison = compare::compare(&path_a, &missing);

    let paired: Vec<(String, TestStatus)> = comparison
        .record_a
        .outcomes
        .iter()
        .map(|o| (o.name.clone(), o.status))
        .collect();
    assert_eq!(solo, paired);
    assert_eq!(comparison.record_a.overall_status(), TestStatus::Passed);

    assert_eq!(comparison.record_b.overall_status(), TestStatus::Failed);
    assert!(comparison
        .record_b
        .outcomes
        .iter()
        .all(|o| o.status == TestStatus::Failed));
    let detail = comparison.record_b.outcomes[0].detail.as_deref().unwrap();
    assert!(detail.contains("not found"), "detail: {detail}");
}

#[test]
fn comparison_of_two_live_candidates_profiles_both() {
    let _lock = PROFILE_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let dir = tempfile::tempdir().unwrap();
    let path_a = write_fixture(&dir, "passing.js", PASSING);
    let path_b = write_fixture(&dir, "mixed.js", MIXED);

    let comparison = compare::compare(&path_a, &path_b);
    assert_eq!(comparison.record_a.overall_status(), TestStatus::Passed);
    assert_eq!(comparison.record_b.overall_status(), TestStatus::Failed);
    assert_eq!(comparison.record_a.outcomes.len(), 2);
    assert_eq!(comparison.record_b.outcomes.len(), 2);
}

#[tokio::test]
async fn analyze_appends_history_and_embeds_collaborator_failure() {
    let _lock = PROFILE_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "passing.js", PASSING);
    let config = test_config(&dir);

    let analyzer = Analyzer::new(&config).unwrap();
    let report = analyzer.analyze(&path, true).await.unwrap();

    assert!(report
        .formatted_profile
        .contains("=== Quick Profiling Summary ==="));
    assert!(report.formatted_profile.contains("Test Status: PASSED"));
    assert!(report
        .optimization_suggestions
        .contains("Error analyzing with LLM"));

    let store = HistoryStore::new(&config.history_file);
    let records = store.query(&path.display().to_string()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].outcomes.len(), 2);
}

#[tokio::test]
async fn analyze_without_save_leaves_history_untouched() {
    let _lock = PROFILE_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "passing.js", PASSING);
    let config = test_config(&dir);

    let analyzer = Analyzer::new(&config).unwrap();
    analyzer.analyze(&path, false).await.unwrap();

    assert!(!std::path::Path::new(&config.history_file).exists());
}

#[test]
fn plot_status_reports_missing_history() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let analyzer = Analyzer::new(&config).unwrap();

    let status = analyzer
        .plot_history(std::path::Path::new("missing.js"))
        .unwrap();
    assert_eq!(status, "No history data available");
}

#[test]
fn plot_writes_a_deterministically_named_svg() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let records: Vec<_> = (0..3)
        .map(|i| {
            codemedic::report::ProfileRecord {
                test_file: "/abs/dir/sample_test.js".to_string(),
                timestamp: chrono::Utc::now(),
                execution_time: 0.1 * (i + 1) as f64,
                memory_usage: codemedic::report::MemoryUsage {
                    current: 1.0,
                    peak: 2.0 + i as f64,
                },
                profile_stats: String::new(),
                outcomes: vec![],
            }
        })
        .collect();

    let out = codemedic::plot::render_history("/abs/dir/sample_test.js", &records).unwrap();
    assert_eq!(
        out,
        PathBuf::from("performance_history_sample_test.js.svg")
    );
    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("<svg"));
}
