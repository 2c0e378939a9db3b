//! codemedic -- profiling harness and optimization advisor for JavaScript
//! test files.
//!
//! This crate loads a test file into an embedded engine, runs its
//! `test_`-prefixed functions under CPU sampling and allocation tracing,
//! persists the resulting profile records as a longitudinal history, and
//! compares implementations against each other.

pub mod analysis;
pub mod analyzer;
pub mod compare;
pub mod config;
pub mod history;
pub mod instrument;
pub mod loader;
pub mod plot;
pub mod report;
pub mod runner;

use std::path::Path;

use anyhow::Result;

use crate::report::ProfileRecord;

/// Profile one test file: load it, run its tests under a fresh
/// instrumentation session, and build the profile record.
pub fn profile_test_file(path: &Path) -> Result<ProfileRecord> {
    tracing::debug!(path = %path.display(), "Profiling test file");
    let unit = loader::ScriptUnit::load(path)?;
    let session = instrument::InstrumentSession::acquire()?;
    let (outcomes, instrumentation) = session.run(|| runner::execute(&unit))?;
    Ok(ProfileRecord::build(path, instrumentation, outcomes))
}
