//! Instrumentation session -- CPU sampling and allocation tracing bracketing
//! one unit of work, with guaranteed release on every exit path.
//!
//! Both instruments are process-global singletons, so at most one session may
//! be active per process. `acquire` enforces that as a hard precondition
//! instead of letting a nested session corrupt the outer one's measurements.

pub mod cpu;
pub mod memory;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("an instrumentation session is already active in this process")]
    SessionActive,
    #[error("cpu profiler error: {0}")]
    Cpu(#[from] pprof::Error),
}

/// Measurements collected over one instrumentation window.
#[derive(Debug, Clone)]
pub struct InstrumentationResult {
    pub execution_time: f64,
    pub memory_current_mb: f64,
    pub memory_peak_mb: f64,
    pub profile_stats: String,
}

static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Scoped ownership of the process-global profiler and memory tracer.
pub struct InstrumentSession {
    armed: bool,
}

impl InstrumentSession {
    /// Claim the instrumentation slot. Fails fast if a session is active.
    pub fn acquire() -> Result<Self, InstrumentError> {
        if SESSION_ACTIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(InstrumentError::SessionActive);
        }
        Ok(Self { armed: true })
    }

    /// Whether any session currently holds the instrumentation slot.
    pub fn is_active() -> bool {
        SESSION_ACTIVE.load(Ordering::SeqCst)
    }

    /// Run `work` inside the instrumentation window.
    ///
    /// Start order is memory trace, CPU profiler, clock; stop order is the
    /// reverse. A panic inside `work` unwinds through the session and both
    /// instruments are still stopped and the slot released (drop guard).
    pub fn run<T>(
        mut self,
        work: impl FnOnce() -> T,
    ) -> Result<(T, InstrumentationResult), InstrumentError> {
        memory::start_trace();
        let profiler = cpu::CpuProfiler::start()?;
        let started = Instant::now();

        let value = work();

        let execution_time = started.elapsed().as_secs_f64();
        let profile_stats = profiler.stop()?;
        let (memory_current_mb, memory_peak_mb) = memory::usage_mb();
        memory::stop_trace();

        self.armed = false;
        SESSION_ACTIVE.store(false, Ordering::SeqCst);

        Ok((
            value,
            InstrumentationResult {
                execution_time,
                memory_current_mb,
                memory_peak_mb,
                profile_stats,
            },
        ))
    }
}

impl Drop for InstrumentSession {
    fn drop(&mut self) {
        if self.armed {
            memory::stop_trace();
            SESSION_ACTIVE.store(false, Ordering::SeqCst);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_measures_and_releases_on_success() {
        let _lock = test_support::INSTRUMENT_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        let session = InstrumentSession::acquire().unwrap();
        let (value, result) = session
            .run(|| {
                let buf = vec![1u8; 1024 * 1024];
                buf.len()
            })
            .unwrap();

        assert_eq!(value, 1024 * 1024);
        assert!(result.execution_time >= 0.0);
        assert!(result.memory_peak_mb >= 0.0);
        assert!(!InstrumentSession::is_active());
        assert!(!memory::is_tracing());
    }

    #[test]
    fn nested_sessions_are_rejected() {
        let _lock = test_support::INSTRUMENT_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        let session = InstrumentSession::acquire().unwrap();
        assert!(matches!(
            InstrumentSession::acquire(),
            Err(InstrumentError::SessionActive)
        ));
        drop(session);
        assert!(!InstrumentSession::is_active());
    }

    #[test]
    fn panicking_work_still_releases_instruments() {
        let _lock = test_support::INSTRUMENT_LOCK
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        let session = InstrumentSession::acquire().unwrap();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = session.run(|| panic!("boom"));
        }));

        assert!(outcome.is_err());
        assert!(!InstrumentSession::is_active());
        assert!(!memory::is_tracing());

        // The slot is reusable afterwards.
        let again = InstrumentSession::acquire().unwrap();
        drop(again);
    }
}
