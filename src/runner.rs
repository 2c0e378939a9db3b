//! Test discovery and execution -- enumerate `test_`-prefixed callables and
//! record per-test outcomes without aborting the batch.

use serde::{Deserialize, Serialize};

use crate::loader::ScriptUnit;

/// Naming convention for discoverable test functions.
pub const TEST_PREFIX: &str = "test_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
}

/// One callable's result, carried as data rather than control flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub name: String,
    pub status: TestStatus,
    pub detail: Option<String>,
}

impl TestOutcome {
    pub fn passed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Passed,
            detail: None,
        }
    }

    pub fn failed(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Failed,
            detail: Some(detail.into()),
        }
    }
}

/// Run every `test_`-prefixed callable in the unit, in enumeration order.
/// A failing test never prevents the rest of the batch from running; a
/// callable that returns normally passes regardless of its return value.
pub fn execute(unit: &ScriptUnit) -> Vec<TestOutcome> {
    let mut outcomes = Vec::new();
    for name in unit.callable_names() {
        if !name.starts_with(TEST_PREFIX) {
            continue;
        }
        match unit.invoke(name) {
            Ok(()) => {
                tracing::debug!(test = %name, "Test passed");
                outcomes.push(TestOutcome::passed(name.clone()));
            }
            Err(err) => {
                tracing::debug!(test = %name, error = %err, "Test failed");
                outcomes.push(TestOutcome::failed(name.clone(), err.message));
            }
        }
    }
    outcomes
}
