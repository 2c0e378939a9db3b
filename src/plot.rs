//! History chart rendering -- execution time and peak memory over runs.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use plotters::prelude::*;

use crate::report::ProfileRecord;

const CHART_SIZE: (u32, u32) = (1000, 800);

/// Render the series for one test file to a deterministically named SVG in
/// the working directory. The caller guarantees `records` is non-empty.
pub fn render_history(test_file: &str, records: &[ProfileRecord]) -> Result<PathBuf> {
    let out = PathBuf::from(format!("performance_history_{}.svg", sanitize(test_file)));

    let times: Vec<(f64, f64)> = records
        .iter()
        .enumerate()
        .map(|(i, record)| (i as f64, record.execution_time))
        .collect();
    let peaks: Vec<(f64, f64)> = records
        .iter()
        .enumerate()
        .map(|(i, record)| (i as f64, record.memory_usage.peak))
        .collect();

    draw(&out, test_file, &times, &peaks)
        .map_err(|err| anyhow!("failed to render history chart: {err}"))?;

    tracing::debug!(plot = %out.display(), runs = records.len(), "History chart written");
    Ok(out)
}

fn draw(
    out: &Path,
    test_file: &str,
    times: &[(f64, f64)],
    peaks: &[(f64, f64)],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(out, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(400);

    draw_series(
        &upper,
        &format!("Execution Time History: {}", basename(test_file)),
        "Execution Time (seconds)",
        times,
        &BLUE,
    )?;
    draw_series(
        &lower,
        "Memory Usage History",
        "Peak Memory Usage (MB)",
        peaks,
        &RED,
    )?;

    root.present()?;
    Ok(())
}

fn draw_series(
    area: &DrawingArea<SVGBackend<'_>, plotters::coord::Shift>,
    caption: &str,
    y_label: &str,
    points: &[(f64, f64)],
    color: &RGBColor,
) -> Result<(), Box<dyn std::error::Error>> {
    let x_max = points.len().saturating_sub(1).max(1) as f64;
    let y_max = points
        .iter()
        .map(|(_, y)| *y)
        .fold(0.0_f64, f64::max)
        .max(1e-6)
        * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(64)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)?;

    chart.configure_mesh().x_desc("Run").y_desc(y_label).draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), color))?;
    chart.draw_series(
        points
            .iter()
            .map(|(x, y)| Circle::new((*x, *y), 3, color.filled())),
    )?;

    Ok(())
}

fn basename(test_file: &str) -> String {
    Path::new(test_file)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| test_file.to_string())
}

fn sanitize(test_file: &str) -> String {
    basename(test_file).replace(['\\', '/'], "_")
}
