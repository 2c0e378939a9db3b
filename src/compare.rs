//! Side-by-side comparison of two test-file implementations.

use std::path::Path;

use crate::instrument::InstrumentationResult;
use crate::report::ProfileRecord;
use crate::runner::TestOutcome;

/// Both candidates' records, packaged for downstream analysis.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub record_a: ProfileRecord,
    pub record_b: ProfileRecord,
}

/// Profile both candidates independently, serially. Each gets a fresh engine
/// and a fresh instrumentation session; one side failing never blocks the
/// other. Whether a double failure still makes a meaningful comparison is the
/// caller's call.
pub fn compare(path_a: &Path, path_b: &Path) -> Comparison {
    Comparison {
        record_a: profile_candidate(path_a),
        record_b: profile_candidate(path_b),
    }
}

/// One candidate's record. Any pipeline failure folds into an all-failed
/// record with zero metrics instead of propagating.
pub fn profile_candidate(path: &Path) -> ProfileRecord {
    match crate::profile_test_file(path) {
        Ok(record) => record,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Candidate failed to profile");
            ProfileRecord::build(
                path,
                InstrumentationResult {
                    execution_time: 0.0,
                    memory_current_mb: 0.0,
                    memory_peak_mb: 0.0,
                    profile_stats: String::new(),
                },
                vec![TestOutcome::failed("load", err.to_string())],
            )
        }
    }
}
