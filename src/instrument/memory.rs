//! Allocation tracing -- a global-allocator wrapper with live/peak counters.
//!
//! The tracer works in windows: `start_trace` snapshots the live byte count
//! as a baseline and resets the peak to it, so readings report what the
//! traced work allocated on top of whatever was already live. QuickJS engine
//! allocations go through this allocator too (`rust-alloc`), so script work
//! is visible here.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Global allocator wrapper that tracks live and peak heap usage.
pub struct TrackingAllocator {
    inner: System,
    current: AtomicUsize,
    peak: AtomicUsize,
}

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { self.inner.alloc(layout) };
        if !ptr.is_null() {
            let prev = self.current.fetch_add(layout.size(), Ordering::Relaxed);
            let new = prev + layout.size();
            // Update peak via CAS loop
            let mut old_peak = self.peak.load(Ordering::Relaxed);
            while new > old_peak {
                match self.peak.compare_exchange_weak(
                    old_peak,
                    new,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => break,
                    Err(actual) => old_peak = actual,
                }
            }
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        self.current.fetch_sub(layout.size(), Ordering::Relaxed);
        unsafe { self.inner.dealloc(ptr, layout) };
    }
}

#[global_allocator]
static ALLOC: TrackingAllocator = TrackingAllocator {
    inner: System,
    current: AtomicUsize::new(0),
    peak: AtomicUsize::new(0),
};

static TRACING: AtomicBool = AtomicBool::new(false);
static BASELINE: AtomicUsize = AtomicUsize::new(0);

/// Begin a trace window: snapshot the live byte count as the baseline and
/// reset the peak to it.
pub fn start_trace() {
    let current = ALLOC.current.load(Ordering::Relaxed);
    BASELINE.store(current, Ordering::Relaxed);
    ALLOC.peak.store(current, Ordering::Relaxed);
    TRACING.store(true, Ordering::Relaxed);
}

/// Current and peak traced usage in MB, relative to the window baseline.
pub fn usage_mb() -> (f64, f64) {
    let base = BASELINE.load(Ordering::Relaxed);
    let current = ALLOC.current.load(Ordering::Relaxed).saturating_sub(base);
    let peak = ALLOC.peak.load(Ordering::Relaxed).saturating_sub(base);
    (current as f64 / BYTES_PER_MB, peak as f64 / BYTES_PER_MB)
}

/// End the trace window.
pub fn stop_trace() {
    TRACING.store(false, Ordering::Relaxed);
}

pub fn is_tracing() -> bool {
    TRACING.load(Ordering::Relaxed)
}
