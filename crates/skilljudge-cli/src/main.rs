//! skilljudge - scenario validation and scoring CLI
//!
//! ## Commands
//!
//! - `validate`: score one execution record against its scenario
//! - `summary`: aggregate one model's results into a Markdown report
//! - `compare`: compare aggregate results across models
//! - `track-fetch`: record documentation fetches during a run
//!
//! `validate` exits 0 when the verdict is PASSED, 1 when FAILED, and 2
//! on startup errors (missing or unparseable inputs).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, Level};

use skilljudge_core::{
    load_results, merge_verdict, report, ConsoleSink, ExecutionRecord, ModelStats, ModelSummary,
    RuleStore, ScenarioDescriptor, TrackingFile, Validator,
};

#[derive(Parser)]
#[command(name = "skilljudge")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate recorded agent test runs against scenarios", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one execution record against a scenario
    Validate {
        /// Path to the scenario YAML file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Path to the result JSON file
        #[arg(short, long)]
        result: PathBuf,

        /// Path to the assertions directory (default: derived from the
        /// scenario location)
        #[arg(long)]
        assertions_dir: Option<PathBuf>,
    },

    /// Generate a summary report for one model's results
    Summary {
        /// Model name
        #[arg(short, long)]
        model: String,

        /// Results directory (default: tests/results/<model>)
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// Output Markdown path (default: <results-dir>/summary.md)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare results across models
    Compare {
        /// Comma-separated model names
        #[arg(short, long)]
        models: String,

        /// Base results directory containing one subdirectory per model
        #[arg(long, default_value = "tests/results")]
        results_dir: PathBuf,

        /// Output Markdown path (default: print to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Track documentation fetches
    TrackFetch {
        #[command(subcommand)]
        action: TrackFetchAction,
    },
}

#[derive(Subcommand)]
enum TrackFetchAction {
    /// Append one fetch to a tracking file
    Add {
        /// Fetched URL
        #[arg(long)]
        url: String,

        /// Page title
        #[arg(long)]
        title: Option<String>,

        /// Fetch duration in milliseconds
        #[arg(long)]
        duration_ms: Option<u64>,

        /// Tracking file path
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print the folded fetch summary for a tracking file
    Summary {
        /// Tracking file path
        #[arg(short, long)]
        file: PathBuf,

        /// Also write the summary JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    skilljudge_core::init_tracing(cli.json, level);

    match run(cli.command, cli.no_color) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(command: Commands, no_color: bool) -> Result<ExitCode> {
    match command {
        Commands::Validate {
            scenario,
            result,
            assertions_dir,
        } => cmd_validate(&scenario, &result, assertions_dir.as_deref(), no_color),
        Commands::Summary {
            model,
            results_dir,
            output,
        } => cmd_summary(&model, results_dir.as_deref(), output.as_deref()),
        Commands::Compare {
            models,
            results_dir,
            output,
        } => cmd_compare(&models, &results_dir, output.as_deref()),
        Commands::TrackFetch { action } => match action {
            TrackFetchAction::Add {
                url,
                title,
                duration_ms,
                file,
            } => cmd_track_add(&url, title.as_deref(), duration_ms, &file),
            TrackFetchAction::Summary { file, output } => {
                cmd_track_summary(&file, output.as_deref())
            }
        },
    }
}

fn cmd_validate(
    scenario_path: &Path,
    result_path: &Path,
    assertions_dir: Option<&Path>,
    no_color: bool,
) -> Result<ExitCode> {
    let scenario = ScenarioDescriptor::load(scenario_path)
        .with_context(|| format!("Failed to load scenario {}", scenario_path.display()))?;
    let record = ExecutionRecord::load(result_path)
        .with_context(|| format!("Failed to load result {}", result_path.display()))?;

    let assertions_dir = match assertions_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_assertions_dir(scenario_path),
    };
    debug!(dir = %assertions_dir.display(), "loading rule store");
    let rules = RuleStore::load_dir(&assertions_dir)
        .with_context(|| format!("Failed to load assertions from {}", assertions_dir.display()))?;

    let mut sink = if no_color {
        ConsoleSink::plain()
    } else {
        ConsoleSink::new()
    };
    let verdict = Validator::new(&scenario, &record, &rules, &mut sink)
        .validate_all()
        .context("Evaluation failed")?;

    print!("{}", report::render_verdict(&verdict));

    merge_verdict(result_path, &verdict)
        .with_context(|| format!("Failed to update {}", result_path.display()))?;

    Ok(if verdict.status.is_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Mirror the harness layout: scenarios live next to an `assertions`
/// directory, either as siblings or one level up under `scenarios/`.
fn default_assertions_dir(scenario_path: &Path) -> PathBuf {
    let parent = scenario_path.parent().unwrap_or_else(|| Path::new("."));
    if parent.file_name().is_some_and(|n| n == "scenarios") {
        parent
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("assertions")
    } else {
        parent.join("assertions")
    }
}

fn cmd_summary(
    model: &str,
    results_dir: Option<&Path>,
    output: Option<&Path>,
) -> Result<ExitCode> {
    let results_dir = match results_dir {
        Some(dir) => dir.to_path_buf(),
        None => Path::new("tests/results").join(model),
    };
    let results = load_results(&results_dir)
        .with_context(|| format!("Failed to load results from {}", results_dir.display()))?;
    if results.is_empty() {
        println!("No results found in {}", results_dir.display());
        return Ok(ExitCode::SUCCESS);
    }

    let summary = ModelSummary::new(model, results);
    print!("{}", report::render_summary_console(&summary));

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => results_dir.join("summary.md"),
    };
    std::fs::write(&output, report::render_summary_markdown(&summary))
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Summary report generated: {}", output.display());

    Ok(ExitCode::SUCCESS)
}

fn cmd_compare(models: &str, results_dir: &Path, output: Option<&Path>) -> Result<ExitCode> {
    let mut stats = Vec::new();
    for model in models.split(',').map(str::trim).filter(|m| !m.is_empty()) {
        let model_dir = results_dir.join(model);
        // A model without results still gets a zeroed table row.
        let results = if model_dir.is_dir() {
            load_results(&model_dir)
                .with_context(|| format!("Failed to load results from {}", model_dir.display()))?
        } else {
            Vec::new()
        };
        stats.push(ModelStats::from_results(model, &results));
    }

    let markdown = report::render_comparison_markdown(&stats);
    match output {
        Some(path) => {
            std::fs::write(path, &markdown)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Comparison report generated: {}", path.display());
        }
        None => print!("{markdown}"),
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_track_add(
    url: &str,
    title: Option<&str>,
    duration_ms: Option<u64>,
    file: &Path,
) -> Result<ExitCode> {
    let mut tracking = TrackingFile::load_or_default(file)
        .with_context(|| format!("Failed to load tracking file {}", file.display()))?;
    tracking.add_fetch(url, title, duration_ms);
    tracking
        .save(file)
        .with_context(|| format!("Failed to save tracking file {}", file.display()))?;
    println!("Tracked fetch: {url}");
    Ok(ExitCode::SUCCESS)
}

fn cmd_track_summary(file: &Path, output: Option<&Path>) -> Result<ExitCode> {
    let tracking = TrackingFile::load_or_default(file)
        .with_context(|| format!("Failed to load tracking file {}", file.display()))?;
    let summary = tracking.summary();
    let json = serde_json::to_string_pretty(&summary)?;

    println!("Total fetches: {}", summary.total_count);
    println!("Unique pages:  {}", tracking.unique_page_count());
    println!("Domains:       {}", summary.domains.join(", "));
    println!("{json}");

    if let Some(path) = output {
        std::fs::write(path, &json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Summary exported: {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}
