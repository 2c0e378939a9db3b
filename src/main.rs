use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use codemedic::analyzer::Analyzer;
use codemedic::config::Config;

#[derive(Parser)]
#[command(
    name = "codemedic",
    about = "Profiling harness and LLM-backed optimization advisor for JavaScript test files",
    version,
    long_about = None
)]
struct Cli {
    /// Path to the test file to analyze
    test_file: PathBuf,

    /// Output file to save results as JSON (prints to stdout otherwise)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,

    /// Advisory profiling timeout in seconds (bounds the analysis call)
    #[arg(long, short)]
    timeout: Option<u64>,

    /// Compare with another implementation
    #[arg(long, short)]
    compare: Option<PathBuf>,

    /// Generate a performance history plot
    #[arg(long, short = 'H')]
    history: bool,

    /// Analyze test patterns
    #[arg(long, short)]
    patterns: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(if cli.verbose { "debug" } else { "info" })
            }),
        )
        .init();

    let mut config = Config::from_env();
    if let Some(timeout) = cli.timeout {
        config.profiling_timeout = Duration::from_secs(timeout);
    }
    let analyzer = Analyzer::new(&config)?;

    tracing::info!(test_file = %cli.test_file.display(), "Analyzing test file");

    if let Some(other) = cli.compare.as_deref() {
        let report = analyzer.compare(&cli.test_file, other).await?;
        if cli.history {
            print_history(&analyzer, &cli.test_file)?;
        }
        match cli.output.as_deref() {
            Some(path) => write_output(path, &report)?,
            None => {
                println!("\n=== Comparative Analysis ===");
                println!("{}", report.comparative_analysis);
            }
        }
    } else if cli.patterns {
        let report = analyzer.patterns(&cli.test_file).await?;
        if cli.history {
            print_history(&analyzer, &cli.test_file)?;
        }
        match cli.output.as_deref() {
            Some(path) => write_output(path, &report)?,
            None => {
                println!("\n=== Pattern Analysis ===");
                println!("{}", report.pattern_analysis);
            }
        }
    } else {
        let report = analyzer.analyze(&cli.test_file, true).await?;
        if cli.history {
            print_history(&analyzer, &cli.test_file)?;
        }
        match cli.output.as_deref() {
            Some(path) => write_output(path, &report)?,
            None => {
                println!("\n=== Quick Analysis ===");
                println!("{}", report.formatted_profile);
                println!("\n=== Optimization Results ===");
                println!("{}", report.optimization_suggestions);
            }
        }
    }

    Ok(())
}

fn print_history(analyzer: &Analyzer, test_file: &Path) -> Result<()> {
    let status = analyzer.plot_history(test_file)?;
    println!("\n{status}");
    Ok(())
}

fn write_output<T: serde::Serialize>(path: &Path, report: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    println!("Results saved to {}", path.display());
    Ok(())
}
