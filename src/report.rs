//! Profile records -- one instrumented execution's results, in the shape the
//! history file and output JSON use.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::instrument::InstrumentationResult;
use crate::runner::{TestOutcome, TestStatus};

/// End-of-window and peak traced memory, in megabytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub current: f64,
    pub peak: f64,
}

/// Immutable result of one instrumented execution of a test file.
///
/// `test_file` is the record's identity key: history filtering and plot
/// naming both go through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub test_file: String,
    pub timestamp: DateTime<Utc>,
    pub execution_time: f64,
    pub memory_usage: MemoryUsage,
    pub profile_stats: String,
    #[serde(rename = "test_output", with = "outcome_lines")]
    pub outcomes: Vec<TestOutcome>,
}

impl ProfileRecord {
    /// Assemble a record from one execution. The timestamp is taken here.
    pub fn build(
        test_file: &Path,
        instrumentation: InstrumentationResult,
        outcomes: Vec<TestOutcome>,
    ) -> Self {
        Self {
            test_file: test_file.display().to_string(),
            timestamp: Utc::now(),
            execution_time: instrumentation.execution_time,
            memory_usage: MemoryUsage {
                current: instrumentation.memory_current_mb,
                peak: instrumentation.memory_peak_mb,
            },
            profile_stats: instrumentation.profile_stats,
            outcomes,
        }
    }

    /// Failed if any outcome failed, passed otherwise.
    pub fn overall_status(&self) -> TestStatus {
        if self
            .outcomes
            .iter()
            .any(|outcome| outcome.status == TestStatus::Failed)
        {
            TestStatus::Failed
        } else {
            TestStatus::Passed
        }
    }

    /// The `test_output` lines as persisted, one per outcome.
    pub fn test_output_text(&self) -> String {
        self.outcomes
            .iter()
            .map(outcome_lines::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Short human-readable summary of the headline metrics.
    pub fn summary(&self) -> String {
        let status = match self.overall_status() {
            TestStatus::Passed => "PASSED",
            TestStatus::Failed => "FAILED",
        };
        format!(
            "=== Quick Profiling Summary ===\n\
             Execution Time: {:.2}s | Memory: {:.2}MB peak\n\
             Test Status: {status}",
            self.execution_time, self.memory_usage.peak
        )
    }
}

/// `test_output` wire format: one human-readable line per outcome
/// (`Test <name> passed` / `Test <name> failed: <detail>`).
mod outcome_lines {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::runner::{TestOutcome, TestStatus};

    pub fn render(outcome: &TestOutcome) -> String {
        match outcome.status {
            TestStatus::Passed => format!("Test {} passed", outcome.name),
            TestStatus::Failed => format!(
                "Test {} failed: {}",
                outcome.name,
                outcome.detail.as_deref().unwrap_or_default()
            ),
        }
    }

    pub fn serialize<S: Serializer>(
        outcomes: &[TestOutcome],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let lines: Vec<String> = outcomes.iter().map(render).collect();
        serializer.serialize_str(&lines.join("\n"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<TestOutcome>, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(text.lines().filter_map(parse_line).collect())
    }

    // Lines that match neither shape cannot be attributed to a callable and
    // are dropped.
    fn parse_line(line: &str) -> Option<TestOutcome> {
        let rest = line.strip_prefix("Test ")?;
        if let Some(name) = rest.strip_suffix(" passed") {
            return Some(TestOutcome::passed(name));
        }
        if let Some(split) = rest.find(" failed: ") {
            let name = &rest[..split];
            let detail = &rest[split + " failed: ".len()..];
            return Some(TestOutcome::failed(name, detail));
        }
        if let Some(name) = rest.strip_suffix(" failed") {
            return Some(TestOutcome::failed(name, ""));
        }
        None
    }
}
