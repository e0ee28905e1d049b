//! # seq-validator CLI entry point
//!
//! Parses command-line arguments, installs logging and dispatches to the
//! `validate` and `checkers` subcommands.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use seq_validator::config::ValidationConfig;
use seq_validator::engine::{utc_now_iso, ValidationEngine, ValidationInput};
use seq_validator::registry::CheckerRegistry;
use seq_validator::reporter::{self, REPORT_FILE_NAME};
use seq_validator::types::{CheckStatus, ValidationReport};

/// Exit code for invalid command-line usage.
const USAGE_ERROR: u8 = 2;

/// Validate ICGC ARGO sequencing data submissions.
///
/// Checks a submission's metadata JSON and, when a data directory is
/// available, the BAM/FASTQ files it describes.
#[derive(Parser, Debug)]
#[command(name = "seq-validator", version, about, long_about = None)]
struct Cli {
    /// Show debug information on stderr.
    #[arg(long, global = true)]
    debug: bool,

    /// Path to configuration file (TOML, or YAML by extension).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate one or more submissions.
    Validate(ValidateArgs),

    /// List the registered checkers in run order.
    Checkers,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Submission metadata as a JSON string.
    #[arg(short, long, conflicts_with = "metadata_files")]
    metadata: Option<String>,

    /// Directory holding the sequencing files.
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Write the report (or the summary) to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit single-line JSON.
    #[arg(long)]
    jsonl: bool,

    /// Metadata JSON files, one per submission.
    metadata_files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Checkers => {
            init_logging(cli.debug, None);
            list_checkers();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate(args) => {
            if args.metadata.is_none() && args.metadata_files.is_empty() {
                eprintln!("Must specify one or more metadata files or metadata as a JSON string.");
                return Ok(ExitCode::from(USAGE_ERROR));
            }
            let log_dir = args.data_dir.clone().or_else(|| {
                args.metadata_files
                    .first()
                    .map(|f| absolute_parent(f))
            });
            let log_file = init_logging(cli.debug, log_dir.as_deref());
            run_validate(&args, cli.config.as_deref(), log_file)
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Log file name for a UTC timestamp, e.g. `2024_05_01T12_00_00_123Z.log`.
fn log_file_name(timestamp: &str) -> String {
    format!("{}.log", timestamp.replace(['-', ':', '.'], "_"))
}

/// Install the stderr layer and, with a log directory, the file layer.
///
/// Returns the log file path. Failing to create the file only disables it.
fn init_logging(debug: bool, log_dir: Option<&Path>) -> Option<PathBuf> {
    let stderr_level = if debug { "debug" } else { "warn" };
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(stderr_level));

    let log_file = log_dir.and_then(|dir| match create_log_file(dir) {
        Ok(created) => Some(created),
        Err(e) => {
            eprintln!("warning: file logging disabled: {e:#}");
            None
        }
    });

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);
    let file_layer = log_file.as_ref().map(|(_, file)| {
        fmt::layer()
            .with_writer(Arc::clone(file))
            .with_ansi(false)
            .with_filter(LevelFilter::DEBUG)
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::debug!("seq-validator v{} starting", seq_validator::types::TOOL_VERSION);
    log_file.map(|(path, _)| path)
}

fn create_log_file(dir: &Path) -> anyhow::Result<(PathBuf, Arc<File>)> {
    let logs = dir.join("logs");
    fs::create_dir_all(&logs)
        .with_context(|| format!("failed to create log directory {}", logs.display()))?;
    let path = logs.join(log_file_name(&utc_now_iso()));
    let file = File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    Ok((path, Arc::new(file)))
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn list_checkers() {
    for descriptor in CheckerRegistry::new().descriptors() {
        println!(
            "{:<50} requires_data_dir={:<5} depends_on=[{}]",
            descriptor.name,
            descriptor.requires_data_dir,
            descriptor.depends_on.join(", ")
        );
    }
}

fn run_validate(
    args: &ValidateArgs,
    config_path: Option<&Path>,
    log_file: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    if let Some(metadata) = &args.metadata {
        let mut input = ValidationInput::json(metadata.as_str()).with_log_file(log_file);
        if let Some(dir) = &args.data_dir {
            input = input.with_data_dir(dir);
        }
        let (report, fail_on_warnings) =
            validate_one(input, config_path, args.data_dir.as_deref())?;
        emit(&render(&report, args.jsonl)?, args.output.as_deref())?;
        return Ok(exit_code(report.status(), fail_on_warnings));
    }

    if let [metadata_file] = args.metadata_files.as_slice() {
        let (report, fail_on_warnings) =
            validate_file(metadata_file, args, config_path, log_file)?;
        emit(&render(&report, args.jsonl)?, args.output.as_deref())?;
        return Ok(exit_code(report.status(), fail_on_warnings));
    }

    let started_at = utc_now_iso();
    let total = args.metadata_files.len();
    let mut reports = Vec::with_capacity(total);
    let mut failed = false;

    for (i, metadata_file) in args.metadata_files.iter().enumerate() {
        let (report, fail_on_warnings) =
            validate_file(metadata_file, args, config_path, log_file.clone())?;

        let report_path = absolute_parent(metadata_file).join(REPORT_FILE_NAME);
        fs::write(&report_path, render(&report, args.jsonl)? + "\n")
            .with_context(|| format!("failed to write {}", report_path.display()))?;

        eprintln!(
            "{}",
            reporter::progress_line(
                &metadata_file.display().to_string(),
                report.status(),
                i + 1,
                total
            )
        );
        failed |= !passes(report.status(), fail_on_warnings);
        reports.push(report);
    }
    eprintln!();

    let summary = reporter::build_summary(&reports, started_at);
    emit(&render(&summary, args.jsonl)?, args.output.as_deref())?;
    Ok(if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

fn validate_file(
    metadata_file: &Path,
    args: &ValidateArgs,
    config_path: Option<&Path>,
    log_file: Option<PathBuf>,
) -> anyhow::Result<(ValidationReport, bool)> {
    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| absolute_parent(metadata_file));
    let input = ValidationInput::file(metadata_file)
        .with_data_dir(&data_dir)
        .with_log_file(log_file);
    validate_one(input, config_path, Some(&data_dir))
}

/// Validate with the configuration resolved for this submission.
fn validate_one(
    input: ValidationInput,
    config_path: Option<&Path>,
    data_dir: Option<&Path>,
) -> anyhow::Result<(ValidationReport, bool)> {
    let config = ValidationConfig::resolve(config_path, data_dir)?;
    let engine = ValidationEngine::new(&config)?;
    Ok((engine.validate(input), config.fail_on_warnings))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Serialization shared by reports and summaries.
trait RenderReport {
    fn to_json(&self) -> Result<String, String>;
    fn to_jsonl(&self) -> Result<String, String>;
}

impl<T: Serialize> RenderReport for T {
    fn to_json(&self) -> Result<String, String> {
        reporter::to_json(self)
    }
    fn to_jsonl(&self) -> Result<String, String> {
        reporter::to_jsonl(self)
    }
}

fn render(report: &dyn RenderReport, jsonl: bool) -> anyhow::Result<String> {
    let text = if jsonl {
        report.to_jsonl()
    } else {
        report.to_json()
    };
    text.map_err(|e| anyhow!(e))
}

fn absolute_parent(path: &Path) -> PathBuf {
    let abs = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    match abs.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn emit(text: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => fs::write(path, format!("{text}\n"))
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

/// Whether an overall status counts as success.
fn passes(status: CheckStatus, fail_on_warnings: bool) -> bool {
    match status {
        CheckStatus::Pass => true,
        CheckStatus::Warning => !fail_on_warnings,
        CheckStatus::Invalid | CheckStatus::Unknown => false,
    }
}

fn exit_code(status: CheckStatus, fail_on_warnings: bool) -> ExitCode {
    if passes(status, fail_on_warnings) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_metadata_conflicts_with_files() {
        let parsed = Cli::try_parse_from([
            "seq-validator",
            "validate",
            "-m",
            "{}",
            "metadata.json",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parse_validate_files() {
        let cli = Cli::try_parse_from([
            "seq-validator",
            "--debug",
            "validate",
            "-d",
            "/data",
            "--jsonl",
            "a/metadata.json",
            "b/metadata.json",
        ])
        .unwrap();
        assert!(cli.debug);
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.data_dir, Some(PathBuf::from("/data")));
        assert!(args.jsonl);
        assert_eq!(args.metadata_files.len(), 2);
    }

    #[test]
    fn test_passes() {
        assert!(passes(CheckStatus::Pass, true));
        assert!(passes(CheckStatus::Warning, false));
        assert!(!passes(CheckStatus::Warning, true));
        assert!(!passes(CheckStatus::Invalid, false));
        assert!(!passes(CheckStatus::Unknown, false));
    }

    #[test]
    fn test_log_file_name() {
        assert_eq!(
            log_file_name("2024-05-01T12:00:00.123Z"),
            "2024_05_01T12_00_00_123Z.log"
        );
    }

    #[test]
    fn test_absolute_parent_of_bare_name() {
        assert_eq!(absolute_parent(Path::new("no-such-metadata.json")), PathBuf::from("."));
    }
}
