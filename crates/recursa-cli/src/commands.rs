//! CLI command implementations.

use crate::ExportFormat;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use recursa_core::{load_records, TypeCanonicalizer, VertexKey};
use recursa_graph::{
    analyze, build_graph, Analysis, BuildConfig, BuildReport, CallGraph, Expectation, GraphError,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const CONFIG_DIR: &str = ".recursa";
const CONFIG_FILE: &str = "config.json";

/// Initialize Recursa in a directory.
pub fn init(path: &Path) -> Result<()> {
    let recursa_dir = path.join(CONFIG_DIR);
    let config_path = recursa_dir.join(CONFIG_FILE);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    fs::create_dir_all(&recursa_dir)?;
    fs::write(
        &config_path,
        serde_json::to_string_pretty(&BuildConfig::default())?,
    )?;

    println!("{} Initialized Recursa in {}", "✓".green(), path.display());
    println!(
        "  Run {} to check your resolver output",
        "recursa check <records.json>".cyan()
    );

    Ok(())
}

/// Loads the build configuration for the current directory.
fn load_config(explicit: Option<&Path>) -> Result<BuildConfig> {
    resolve_config(explicit, &std::env::current_dir()?)
}

/// `--config` wins, then `.recursa/config.json` under `dir`, then defaults.
fn resolve_config(explicit: Option<&Path>, dir: &Path) -> Result<BuildConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = dir.join(CONFIG_DIR).join(CONFIG_FILE);
            if !path.exists() {
                debug!("No config file found, using defaults");
                return Ok(BuildConfig::default());
            }
            path
        }
    };

    let input = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
    let config = serde_json::from_str(&input)
        .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;

    debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// One record file built into its own graph.
struct Submission {
    graph: CallGraph,
    report: BuildReport,
    start: Option<VertexKey>,
}

fn build_submission(
    file: &Path,
    config: &BuildConfig,
    start: Option<&str>,
) -> std::result::Result<Submission, GraphError> {
    let records = load_records(file)?;
    let (graph, report) = build_graph(&records, config)?;
    let start = start.map(|symbol| parse_start(symbol, config)).transpose()?;

    Ok(Submission {
        graph,
        report,
        start,
    })
}

/// Parses a start symbol and applies the same rules as the records.
fn parse_start(symbol: &str, config: &BuildConfig) -> std::result::Result<VertexKey, GraphError> {
    let canon = TypeCanonicalizer::new(config.canonicalization);
    Ok(symbol.parse::<VertexKey>()?.canonicalized(&canon))
}

fn analyze_file(
    file: &Path,
    config: &BuildConfig,
    start: Option<&str>,
) -> std::result::Result<Analysis, GraphError> {
    let submission = build_submission(file, config, start)?;
    analyze(&submission.graph, submission.start.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Passed,
    Failed,
    Error,
}

/// Outcome of checking one file.
#[derive(Debug, Serialize)]
struct CheckReport {
    file: PathBuf,
    status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<Analysis>,
}

fn check_file(
    file: &Path,
    config: &BuildConfig,
    start: Option<&str>,
    expectation: Expectation,
) -> CheckReport {
    let (status, message, analysis) = match analyze_file(file, config, start) {
        Ok(analysis) => match analysis.verdict(expectation) {
            Ok(()) => (CheckStatus::Passed, None, Some(analysis)),
            Err(diagnostic) => (
                CheckStatus::Failed,
                Some(diagnostic.to_string()),
                Some(analysis),
            ),
        },
        Err(e) => (CheckStatus::Error, Some(e.to_string()), None),
    };

    CheckReport {
        file: file.to_path_buf(),
        status,
        message,
        analysis,
    }
}

/// Check record files, one independent analysis per file.
///
/// Returns `false` when any verdict fails.
pub fn check(
    config_path: Option<&Path>,
    files: &[PathBuf],
    start: Option<&str>,
    expectation: Expectation,
    json: bool,
) -> Result<bool> {
    let config = load_config(config_path)?;

    let progress = if json || files.len() < 2 {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{pos}/{len}]")?,
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.set_message("Checking files...");
        bar
    };

    let reports: Vec<CheckReport> = files
        .par_iter()
        .map(|file| {
            let report = check_file(file, &config, start, expectation);
            progress.inc(1);
            report
        })
        .collect();

    progress.finish_and_clear();

    let count = |status: CheckStatus| reports.iter().filter(|r| r.status == status).count();
    let passed = count(CheckStatus::Passed);
    let failed = count(CheckStatus::Failed);
    let errors = count(CheckStatus::Error);
    info!(
        "Checked {} files: {} passed, {} failed, {} errors",
        reports.len(),
        passed,
        failed,
        errors
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_reports(&reports);
        println!(
            "\n{} passed, {} failed",
            passed.to_string().green(),
            failed.to_string().red()
        );
    }

    if errors > 0 {
        return Err(format!("{} file(s) could not be checked", errors).into());
    }
    Ok(failed == 0)
}

fn print_reports(reports: &[CheckReport]) {
    for report in reports {
        let file = report.file.display().to_string();
        match report.status {
            CheckStatus::Passed => println!("{} {}", "✓".green(), file),
            CheckStatus::Failed => println!("{} {}", "✗".red(), file.red()),
            CheckStatus::Error => println!("{} {}", "⚠".yellow(), file.yellow()),
        }
        if let Some(message) = &report.message {
            for line in message.lines() {
                println!("    {}", line);
            }
        }
    }
}

/// List the methods that lie on a cycle, grouped by component.
pub fn cycles(
    config_path: Option<&Path>,
    file: &Path,
    start: Option<&str>,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let analysis = analyze_file(file, &config, start)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis.cycles)?);
        return Ok(());
    }

    if analysis.cycles.is_empty() {
        println!("{} No recursion found", "✓".green());
        return Ok(());
    }

    let components = analysis.cycles.components();
    println!(
        "Found {} recursive methods in {} cycles:\n",
        analysis.cycles.len().to_string().cyan(),
        components.len().to_string().cyan()
    );
    for (i, component) in components.iter().enumerate() {
        println!("  {}", format!("Cycle {}", i + 1).yellow());
        for key in component {
            println!("    {}", key.to_string().cyan());
        }
    }

    Ok(())
}

/// Export the call graph as DOT or JSON.
pub fn export(
    config_path: Option<&Path>,
    file: &Path,
    output: Option<&Path>,
    format: ExportFormat,
    start: Option<&str>,
    highlight: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let rendered = render_export(file, &config, format, start, highlight)?;

    match output {
        Some(path) => {
            fs::write(path, rendered)?;
            println!("{} Exported to {}", "✓".green(), path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

fn render_export(
    file: &Path,
    config: &BuildConfig,
    format: ExportFormat,
    start: Option<&str>,
    highlight: bool,
) -> Result<String> {
    let submission = build_submission(file, config, start)?;
    let graph = match &submission.start {
        Some(start) => submission.graph.extract_subgraph(start)?,
        None => submission.graph,
    };

    let rendered = match format {
        ExportFormat::Dot if highlight => graph.to_dot_highlighting(&graph.find_cycles()),
        ExportFormat::Dot => graph.to_dot(),
        ExportFormat::Json => {
            if highlight {
                warn!("--highlight only applies to DOT output");
            }
            graph.to_json()?
        }
    };
    Ok(rendered)
}

/// Show graph statistics and skipped calls.
pub fn status(config_path: Option<&Path>, file: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let submission = build_submission(file, &config, None)?;
    let stats = submission.graph.stats();
    let report = &submission.report;

    println!("{}", "Recursa Status".cyan().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();
    println!("  {} {}", "Records:".bold(), report.records);
    println!("  {} {}", "Methods:".bold(), stats.vertex_count);
    println!(
        "  {} {} ({} dispatch)",
        "Edges:".bold(),
        stats.edge_count,
        stats.dispatch_edges
    );
    println!("  {} {}", "Self-calls:".bold(), stats.self_loops);
    println!(
        "  {} {}",
        "Merged duplicates:".bold(),
        report.merged_declarations
    );
    println!(
        "  {} {} declarations, {} calls",
        "Excluded:".bold(),
        report.excluded_declarations,
        report.excluded_calls
    );

    let skipped = submission.graph.unresolved_calls();
    if skipped.is_empty() {
        println!("\n{} Every call was resolved", "✓".green());
    } else {
        println!(
            "\n{} {} unresolved calls were skipped:",
            "⚠".yellow(),
            skipped.len()
        );
        for call in skipped.iter().take(10) {
            println!("  {}", call);
        }
        if skipped.len() > 10 {
            println!("  ... and {} more", skipped.len() - 10);
        }
    }

    Ok(())
}
