//! CPU sampling -- a start/stop wrapper over the pprof profiler guard, with
//! the collected stacks rendered to text, busiest first.

use pprof::{ProfilerGuard, ProfilerGuardBuilder, Report};

use super::InstrumentError;

const SAMPLE_FREQUENCY_HZ: i32 = 1000;

/// An attached sampling profiler. Dropping it detaches the profiler; `stop`
/// detaches it and renders the report.
pub struct CpuProfiler {
    guard: ProfilerGuard<'static>,
}

impl CpuProfiler {
    /// Attach the profiler. Fails if one is already attached to the process.
    pub fn start() -> Result<Self, InstrumentError> {
        let guard = ProfilerGuardBuilder::default()
            .frequency(SAMPLE_FREQUENCY_HZ)
            .blocklist(&["libc", "libgcc", "pthread", "vdso"])
            .build()?;
        Ok(Self { guard })
    }

    /// Detach and render the collected stacks as text.
    pub fn stop(self) -> Result<String, InstrumentError> {
        let report = self.guard.report().build()?;
        Ok(render_report(&report))
    }
}

/// One line per unique stack, sorted by sample count descending. The text is
/// an opaque blob downstream; ties break on the label for stable output.
fn render_report(report: &Report) -> String {
    let total: isize = report.data.values().sum();

    let mut stacks: Vec<(String, isize)> = report
        .data
        .iter()
        .map(|(frames, count)| {
            let symbols: Vec<String> = frames
                .frames
                .iter()
                .filter_map(|frame| frame.first())
                .map(|symbol| symbol.to_string())
                .collect();
            let label = if symbols.is_empty() {
                "<unknown>".to_string()
            } else {
                symbols.join(" <- ")
            };
            (format!("{}: {}", frames.thread_name, label), *count)
        })
        .collect();
    stacks.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut out = String::new();
    out.push_str(&format!(
        "{} samples at {} Hz, {} unique stacks (sorted by cumulative samples)\n",
        total,
        SAMPLE_FREQUENCY_HZ,
        stacks.len()
    ));
    for (label, count) in &stacks {
        let share = if total > 0 {
            *count as f64 * 100.0 / total as f64
        } else {
            0.0
        };
        out.push_str(&format!("{count:>8} {share:>6.2}%  {label}\n"));
    }
    out
}
