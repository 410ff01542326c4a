//! # CLI Module
//!
//! Command-line interface for Infrascan using `clap`.
//!
//! ## Options
//!
//! | Flag | Description |
//! |------|-------------|
//! | `DIRECTORY` | Directory to scan (defaults to current directory) |
//! | `-p, --providers` | Comma-separated providers to scan |
//! | `-x, --exclude` | Comma-separated directory names to skip |
//! | `-o, --output` | Report output path |
//! | `-s, --min-severity` | Minimum severity included in the report |
//! | `--sequential` | Scan files one at a time |
//! | `--max-concurrent` | Worker pool size for concurrent scans |
//! | `-c, --config` | Path to a configuration file |
//! | `-v, --verbose` | Increase verbosity level (-v, -vv, -vvv) |
//!
//! ## Examples
//!
//! ```bash
//! # Scan the current directory with every provider
//! infrascan
//!
//! # Scan only Terraform files, reporting HIGH and above
//! infrascan infra/ -p terraform -s high -o tf-report.json
//! ```

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing::info;

use crate::analyzers;
use crate::config::FileConfig;
use crate::engine::{Engine, ScanConfig};
use crate::exit_codes;
use crate::exporters::JsonExporter;
use crate::models::{Provider, ScanResult, Severity};
use crate::rules::{builtin, RuleRegistry};
use crate::InfrascanError;

/// Default report path when neither flag nor config file sets one
pub const DEFAULT_OUTPUT: &str = "infrascan-report.json";

/// Infrascan - Scan Infrastructure as Code files for security misconfigurations
#[derive(Parser, Debug)]
#[command(name = "infrascan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan
    #[arg(value_name = "DIRECTORY", default_value = ".")]
    pub directory: PathBuf,

    /// Providers to scan (comma-separated); all providers when omitted
    #[arg(short, long, value_delimiter = ',', value_name = "PROVIDER")]
    pub providers: Vec<Provider>,

    /// Directory names to exclude (comma-separated), on top of the built-in
    /// exclusions
    #[arg(short = 'x', long, value_delimiter = ',', value_name = "DIR")]
    pub exclude: Vec<String>,

    /// Report output path
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Minimum severity included in the report (CRITICAL, HIGH, MEDIUM,
    /// LOW, INFO)
    #[arg(short = 's', long, value_parser = parse_severity, value_name = "SEVERITY")]
    pub min_severity: Option<Severity>,

    /// Scan files one at a time instead of concurrently
    #[arg(long)]
    pub sequential: bool,

    /// Worker pool size for concurrent scans (defaults to available cores)
    #[arg(long, value_name = "N")]
    pub max_concurrent: Option<usize>,

    /// Path to a configuration file (defaults to .infrascan.toml in the
    /// scanned directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_severity(s: &str) -> Result<Severity, String> {
    Severity::from_string(s).ok_or_else(|| {
        format!(
            "unknown severity '{}'. Valid options: CRITICAL, HIGH, MEDIUM, LOW, INFO",
            s
        )
    })
}

/// Run a scan from parsed arguments and return the process exit code
pub async fn run(cli: Cli) -> Result<i32, InfrascanError> {
    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::load_or_default(&cli.directory)?,
    };

    let config = merge(&cli, &file_config);
    let output = cli
        .output
        .clone()
        .or_else(|| file_config.output.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    info!(directory = %cli.directory.display(), "starting scan");

    let mut registry = RuleRegistry::new();
    registry.register_all(builtin::all());

    let mut engine = Engine::new(registry, config);
    for analyzer in analyzers::builtin() {
        engine.register_analyzer(analyzer);
    }
    let engine = engine.with_exporter(Box::new(JsonExporter::new(output.clone())));

    let results = engine.scan(&cli.directory).await?;

    print_summary(&results, &output);

    let total: usize = results.iter().map(|r| r.findings.len()).sum();
    if total > 0 {
        Ok(exit_codes::FINDINGS)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}

/// Merge command-line flags over configuration file values. Flags win
/// whenever both are set.
fn merge(cli: &Cli, file: &FileConfig) -> ScanConfig {
    let defaults = ScanConfig::default();

    let providers = if cli.providers.is_empty() {
        file.parsed_providers()
    } else {
        cli.providers.clone()
    };

    let exclude_dirs = if cli.exclude.is_empty() {
        file.exclude.clone()
    } else {
        cli.exclude.clone()
    };

    let min_severity = cli
        .min_severity
        .or_else(|| file.min_severity.as_deref().and_then(Severity::from_string));

    ScanConfig {
        providers,
        exclude_dirs,
        sequential: cli.sequential || file.sequential.unwrap_or(false),
        max_concurrent: cli
            .max_concurrent
            .or(file.max_concurrent)
            .unwrap_or(defaults.max_concurrent),
        min_severity,
    }
}

fn print_summary(results: &[ScanResult], output: &std::path::Path) {
    let count = |severity: Severity| -> usize {
        results
            .iter()
            .flat_map(|r| &r.findings)
            .filter(|f| f.severity == severity)
            .count()
    };

    let total: usize = results.iter().map(|r| r.findings.len()).sum();

    println!(
        "\n{}\n  {}\n{}",
        "━".repeat(50).dimmed(),
        "SCAN RESULTS".bold(),
        "━".repeat(50).dimmed()
    );
    println!("  Files scanned:  {}", results.len());
    println!("  Total findings: {}", total);

    if total > 0 {
        let lines = [
            (Severity::Critical, count(Severity::Critical)),
            (Severity::High, count(Severity::High)),
            (Severity::Medium, count(Severity::Medium)),
            (Severity::Low, count(Severity::Low)),
            (Severity::Info, count(Severity::Info)),
        ];
        for (severity, n) in lines {
            if n == 0 {
                continue;
            }
            let label = match severity {
                Severity::Critical => "CRITICAL".red().bold(),
                Severity::High => "HIGH".red(),
                Severity::Medium => "MEDIUM".yellow(),
                Severity::Low => "LOW".blue(),
                Severity::Info => "INFO".dimmed(),
            };
            println!("    {:<8} {}", label, n);
        }
    }

    println!("\n  Report written to {}\n", output.display().to_string().cyan());
}
