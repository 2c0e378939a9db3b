//! Orchestration facade -- profile, persist, analyze, and report.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::analysis::{self, LlmClient};
use crate::compare;
use crate::config::Config;
use crate::history::HistoryStore;
use crate::plot;
use crate::report::ProfileRecord;

/// Full result of a single-file analysis run.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub profile_data: ProfileRecord,
    pub formatted_profile: String,
    pub optimization_suggestions: String,
}

/// Full result of a two-candidate comparison run.
#[derive(Debug, Serialize)]
pub struct ComparisonReport {
    pub implementation1: ProfileRecord,
    pub implementation2: ProfileRecord,
    pub comparative_analysis: String,
}

/// Full result of a pattern-analysis run.
#[derive(Debug, Serialize)]
pub struct PatternReport {
    pub profile_data: ProfileRecord,
    pub pattern_analysis: String,
}

pub struct Analyzer {
    history: HistoryStore,
    llm: LlmClient,
}

impl Analyzer {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            history: HistoryStore::new(&config.history_file),
            llm: LlmClient::new(config)?,
        })
    }

    /// Profile one test file, append the record to history, and fetch
    /// optimization suggestions.
    pub async fn analyze(&self, test_file: &Path, save_history: bool) -> Result<AnalysisReport> {
        let record = crate::profile_test_file(test_file)?;

        if save_history {
            self.history
                .append(&record)
                .context("failed to update performance history")?;
        }

        let original_code = fs::read_to_string(test_file)
            .with_context(|| format!("failed to re-read {}", test_file.display()))?;
        let suggestions = self
            .llm
            .generate(&analysis::optimization_prompt(&record, &original_code))
            .await;

        let formatted_profile = record.summary();
        Ok(AnalysisReport {
            profile_data: record,
            formatted_profile,
            optimization_suggestions: suggestions,
        })
    }

    /// Profile two implementations side by side and fetch a comparative
    /// analysis. Neither candidate's failure blocks the other.
    pub async fn compare(&self, test_file: &Path, other: &Path) -> Result<ComparisonReport> {
        let comparison = compare::compare(test_file, other);
        let analysis_text = self
            .llm
            .generate(&analysis::comparative_prompt(&comparison))
            .await;
        Ok(ComparisonReport {
            implementation1: comparison.record_a,
            implementation2: comparison.record_b,
            comparative_analysis: analysis_text,
        })
    }

    /// Profile one test file and fetch a structural pattern analysis.
    pub async fn patterns(&self, test_file: &Path) -> Result<PatternReport> {
        let record = crate::profile_test_file(test_file)?;
        let test_code = fs::read_to_string(test_file)
            .with_context(|| format!("failed to re-read {}", test_file.display()))?;
        let analysis_text = self
            .llm
            .generate(&analysis::structure_prompt(&record, &test_code))
            .await;
        Ok(PatternReport {
            profile_data: record,
            pattern_analysis: analysis_text,
        })
    }

    /// Render the performance history chart for one test file. Returns a
    /// human-readable status line; an empty history is a status, not an
    /// error.
    pub fn plot_history(&self, test_file: &Path) -> Result<String> {
        if !self.history.path().exists() {
            return Ok("No history data available".to_string());
        }
        let key = test_file.display().to_string();
        let records = self.history.query(&key)?;
        if records.is_empty() {
            return Ok("No history data available for this test file".to_string());
        }
        let out = plot::render_history(&key, &records)?;
        Ok(format!("Performance history plot saved to {}", out.display()))
    }
}
