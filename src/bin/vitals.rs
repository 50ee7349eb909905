//! Vitals CLI - Command-line interface for Vitals
//!
//! Commands:
//! - generate: Produce a mock health snapshot
//! - score: Compute the health score report of a snapshot
//! - summary: Per-metric goal progress, mood level and trend
//! - correlate: Correlate pairs of metrics of a snapshot
//! - overlay: Align selected metrics on a common date axis
//! - doctor: Diagnose configuration and environment

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use vitals_core::correlation::CorrelationAnalyzer;
use vitals_core::overlay::{align_overlay, DEFAULT_OVERLAY_SELECTION, OVERLAY_OPTIONS};
use vitals_core::pipeline::{
    generate_snapshot_with, metric_summaries, parse_metrics, score_report, snapshot_from_json,
    snapshot_to_json,
};
use vitals_core::{GeneratorConfig, HealthSnapshot, MetricKind, PRODUCER_NAME, VITALS_VERSION};

/// Vitals - Health metrics data model
#[derive(Parser)]
#[command(name = "vitals")]
#[command(version = VITALS_VERSION)]
#[command(about = "Generate, score and correlate health metric snapshots", long_about = None)]
struct Cli {
    /// Enable debug logging (otherwise controlled by VITALS_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Produce a mock health snapshot ending today
    Generate {
        /// Seed for reproducible output (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Days per series (overrides the config file)
        #[arg(long)]
        days: Option<usize>,

        /// Generator configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Compute the health score report of a snapshot
    Score {
        /// Snapshot file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarise every metric: goal progress, mood level and trend
    Summary {
        /// Snapshot file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output summaries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Correlate every pair of the selected metrics
    Correlate {
        /// Snapshot file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Metrics to compare (comma-separated)
        #[arg(long, value_delimiter = ',', default_value = "sleep,mood")]
        metrics: Vec<String>,

        /// Include pairs below the significance threshold
        #[arg(long)]
        all: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Align selected metrics on the anchor metric's dates
    Overlay {
        /// Snapshot file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Metric whose dates define the rows
        #[arg(long, default_value = "sleep")]
        anchor: String,

        /// Metrics to include (comma-separated)
        #[arg(long, value_delimiter = ',', conflicts_with = "all")]
        metrics: Vec<String>,

        /// Include every metric offered by the comparison chart
        #[arg(long)]
        all: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check a generator configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("VITALS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<(), VitalsCliError> {
    match cli.command {
        Commands::Generate {
            seed,
            days,
            config,
            output,
            output_format,
        } => cmd_generate(seed, days, config.as_deref(), &output, output_format),

        Commands::Score { input, json } => cmd_score(&input, json),

        Commands::Summary { input, json } => cmd_summary(&input, json),

        Commands::Correlate {
            input,
            metrics,
            all,
            json,
        } => cmd_correlate(&input, &metrics, all, json),

        Commands::Overlay {
            input,
            anchor,
            metrics,
            all,
        } => cmd_overlay(&input, &anchor, &metrics, all),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_generate(
    seed: Option<u64>,
    days: Option<usize>,
    config_path: Option<&Path>,
    output: &Path,
    output_format: OutputFormat,
) -> Result<(), VitalsCliError> {
    let mut config = match config_path {
        Some(path) => GeneratorConfig::from_json(&fs::read_to_string(path)?)?,
        None => GeneratorConfig::default(),
    };
    if let Some(days) = days {
        config.window_days = days;
    }

    let snapshot = generate_snapshot_with(config, seed)?;

    let output_data = match output_format {
        OutputFormat::Json => snapshot_to_json(&snapshot)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&snapshot)?,
    };

    if output.to_string_lossy() == "-" {
        println!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_score(input: &Path, json: bool) -> Result<(), VitalsCliError> {
    let snapshot = read_snapshot(input)?;
    let report = score_report(&snapshot);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Health score: {} ({})",
        report.health_score,
        report.rating.label()
    );
    println!();
    println!("Contributions:");
    println!("  mood        {:>6.1}", report.breakdown.mood);
    println!("  sleep       {:>6.1}", report.breakdown.sleep);
    println!("  water       {:>6.1}", report.breakdown.water);
    println!("  steps       {:>6.1}", report.breakdown.steps);
    println!("  heart_rate  {:>6.1}", report.breakdown.heart_rate);

    for (label, progress) in [
        ("Water", report.water_progress),
        ("Steps", report.step_progress),
    ] {
        if let Some(progress) = progress {
            println!(
                "{} goal: {} of {} ({:.0}%)",
                label, progress.current, progress.goal, progress.percent
            );
        }
    }

    Ok(())
}

fn cmd_correlate(
    input: &Path,
    metric_names: &[String],
    all: bool,
    json: bool,
) -> Result<(), VitalsCliError> {
    let snapshot = read_snapshot(input)?;
    let metrics = parse_metrics(metric_names)?;
    if metrics.len() < 2 {
        return Err(VitalsCliError::TooFewMetrics);
    }

    let results = if all {
        CorrelationAnalyzer::pairwise(&snapshot, &metrics)
    } else {
        CorrelationAnalyzer::insights(&snapshot, &metrics)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("No significant correlations between the selected metrics");
    } else {
        for result in &results {
            println!("{}", result.describe());
        }
    }

    Ok(())
}

fn cmd_summary(input: &Path, json: bool) -> Result<(), VitalsCliError> {
    let snapshot = read_snapshot(input)?;
    let summaries = metric_summaries(&snapshot);

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for summary in &summaries {
        let mut line = format!("{:<11} {:>8} {}", summary.label, summary.current, summary.unit);
        if let Some(level) = summary.mood_level {
            line.push_str(&format!(" ({})", level.label()));
        }
        if let Some(progress) = summary.goal_progress {
            line.push_str(&format!(", {:.0}% of goal", progress.percent));
        }
        if let Some(trend) = &summary.trend {
            line.push_str(&format!(", {:+.1} over the window", trend.total_change));
        }
        println!("{}", line.trim_end());
    }

    Ok(())
}

fn cmd_overlay(
    input: &Path,
    anchor: &str,
    metric_names: &[String],
    all: bool,
) -> Result<(), VitalsCliError> {
    let snapshot = read_snapshot(input)?;
    let anchor: MetricKind = anchor.parse()?;
    let metrics = if all {
        OVERLAY_OPTIONS.to_vec()
    } else if metric_names.is_empty() {
        DEFAULT_OVERLAY_SELECTION.to_vec()
    } else {
        parse_metrics(metric_names)?
    };

    let rows = align_overlay(&snapshot, anchor, &metrics);
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), VitalsCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "vitals_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Vitals version {}", VITALS_VERSION),
    });

    if let Some(config_path) = config {
        if config_path.exists() {
            let check = match fs::read_to_string(config_path) {
                Ok(content) => match GeneratorConfig::from_json(&content) {
                    Ok(config) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Config valid ({} day window, goals {} cups / {} steps)",
                            config.window_days, config.water_goal_cups, config.step_goal
                        ),
                    },
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid config: {}", e),
                    },
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read config file: {}", e),
                },
            };
            checks.push(check);
        } else {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            });
        }
    }

    // Snapshot-reading commands default to stdin
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass snapshots with --input)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (snapshots can be piped in)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: VITALS_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Vitals Doctor Report");
        println!("====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(VitalsCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_snapshot(input: &Path) -> Result<HealthSnapshot, VitalsCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    if input_data.trim().is_empty() {
        return Err(VitalsCliError::EmptyInput);
    }

    Ok(snapshot_from_json(&input_data)?)
}

// Error types

#[derive(Debug)]
enum VitalsCliError {
    Io(io::Error),
    Compute(vitals_core::ComputeError),
    Json(serde_json::Error),
    EmptyInput,
    TooFewMetrics,
    DoctorFailed,
}

impl From<io::Error> for VitalsCliError {
    fn from(e: io::Error) -> Self {
        VitalsCliError::Io(e)
    }
}

impl From<vitals_core::ComputeError> for VitalsCliError {
    fn from(e: vitals_core::ComputeError) -> Self {
        VitalsCliError::Compute(e)
    }
}

impl From<serde_json::Error> for VitalsCliError {
    fn from(e: serde_json::Error) -> Self {
        VitalsCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<VitalsCliError> for CliError {
    fn from(e: VitalsCliError) -> Self {
        match e {
            VitalsCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            VitalsCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure the input is a snapshot produced by 'vitals generate'".to_string()),
            },
            VitalsCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            VitalsCliError::EmptyInput => CliError {
                code: "EMPTY_INPUT".to_string(),
                message: "No snapshot found in input".to_string(),
                hint: Some("Pipe a snapshot in or pass --input".to_string()),
            },
            VitalsCliError::TooFewMetrics => CliError {
                code: "TOO_FEW_METRICS".to_string(),
                message: "At least two metrics are needed for a correlation".to_string(),
                hint: Some("Pass --metrics sleep,mood".to_string()),
            },
            VitalsCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
