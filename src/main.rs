// LogInspector - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing (flags with env fallbacks)
// 2. Config loading and logging initialisation
// 3. Window resolution and source setup
// 4. Plain search or the two-phase extract / follow-up workflow
// 5. Output rendering and exit codes

use clap::Parser;
use loginspector::app::inspector::{parse_source_list, ExtractSpec, Inspector, TwoPhaseOutcome};
use loginspector::app::window::{resolve_window, TimeWindow};
use loginspector::core::export::{self, OutputFormat};
use loginspector::core::query::JmespathEvaluator;
use loginspector::platform::config::{self, AppConfig, PlatformPaths};
use loginspector::platform::file_source::FileSource;
use loginspector::util::error::{InspectorError, Result};
use loginspector::util::{constants, logging};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// LogInspector - concurrent log search across many sources.
#[derive(Parser, Debug)]
#[command(name = "loginspector", version, about)]
struct Cli {
    /// Comma-separated log source names.
    #[arg(short = 'g', long = "sources", env = "LOG_SOURCES")]
    sources: Option<String>,

    /// Filter pattern for the (first) search.
    #[arg(short = 'f', long = "filter-pattern")]
    filter_pattern: String,

    /// Extract a value from the matched messages: name=path.
    #[arg(short = 'e', long = "extract")]
    extract: Option<String>,

    /// Follow-up filter expression using {{name}} placeholders.
    #[arg(short = 'n', long = "next-filter", requires = "extract")]
    next_filter: Option<String>,

    /// Window start (RFC3339).
    #[arg(long)]
    start: Option<String>,

    /// Window end (RFC3339).
    #[arg(long)]
    end: Option<String>,

    /// Maximum concurrent source queries.
    #[arg(short = 'c', long)]
    concurrency: Option<usize>,

    /// Root directory holding one subdirectory per source.
    #[arg(long = "source-root", env = "LOG_SOURCE_ROOT")]
    source_root: Option<PathBuf>,

    /// Events per page when reading a source.
    #[arg(long = "page-size")]
    page_size: Option<usize>,

    /// Output format for matched records.
    #[arg(long, value_parser = ["text", "json", "csv"])]
    format: Option<String>,

    /// Pretty-print JSON output (implies --format json).
    #[arg(short = 'p', long)]
    pretty: bool,

    /// Config file to use instead of the platform default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let platform_paths = PlatformPaths::resolve();

    let (app_config, config_warnings) = match load_app_config(cli.config.as_deref(), &platform_paths) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(exit_code_for(&e));
        }
    };

    logging::init(cli.debug, app_config.log_level.as_deref());
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "LogInspector starting"
    );

    let code = match run(&cli, &app_config, &platform_paths) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Search failed");
            eprintln!("error: {e}");
            exit_code_for(&e)
        }
    };
    std::process::exit(code);
}

/// An explicit --config must load; the default location may be absent.
fn load_app_config(
    explicit: Option<&Path>,
    paths: &PlatformPaths,
) -> Result<(AppConfig, Vec<String>)> {
    match explicit {
        Some(path) => Ok(config::load_config_file(path)?),
        None => Ok(config::load_config(paths)),
    }
}

/// Usage-type errors exit 2; everything else is a runtime failure.
fn exit_code_for(err: &InspectorError) -> i32 {
    match err {
        InspectorError::Validation(_) | InspectorError::Window(_) => constants::EXIT_USAGE,
        _ => constants::EXIT_FAILURE,
    }
}

fn run(cli: &Cli, app_config: &AppConfig, paths: &PlatformPaths) -> Result<i32> {
    let sources = parse_source_list(cli.sources.as_deref().unwrap_or_default());
    if sources.is_empty() {
        eprintln!("error: no log sources provided (use --sources or LOG_SOURCES)");
        return Ok(constants::EXIT_FAILURE);
    }

    let extract = cli.extract.as_deref().map(ExtractSpec::parse).transpose()?;

    let window = resolve_window(
        cli.start.as_deref(),
        cli.end.as_deref(),
        chrono::Utc::now(),
        app_config.default_window_hours,
    )?;

    let source_root = cli
        .source_root
        .clone()
        .or_else(|| app_config.source_root.clone())
        .unwrap_or_else(|| paths.default_source_root());
    let page_size = cli
        .page_size
        .unwrap_or(app_config.page_size)
        .clamp(constants::MIN_PAGE_SIZE, constants::MAX_PAGE_SIZE);
    let concurrency = cli
        .concurrency
        .unwrap_or(app_config.concurrency)
        .min(constants::ABSOLUTE_MAX_CONCURRENCY);
    let pretty = cli.pretty || app_config.pretty;

    tracing::debug!(
        sources = sources.len(),
        root = %source_root.display(),
        page_size,
        concurrency,
        start = %window.start,
        end = %window.end,
        "Search configured"
    );

    let inspector = Inspector::new(
        Arc::new(FileSource::new(source_root, page_size)),
        Box::new(JmespathEvaluator),
        sources,
        window.start,
        window.end,
        concurrency,
    );

    let Some(extract) = extract else {
        let records = inspector.search(&cli.filter_pattern)?;
        if records.is_empty() {
            print_no_logs(&cli.filter_pattern, &window, app_config);
            return Ok(0);
        }
        let format = match cli.format.as_deref().and_then(OutputFormat::from_name) {
            Some(format) => format,
            None if pretty => OutputFormat::Json,
            None => app_config.output_format,
        };
        export::write_records(&records, format, pretty, io::stdout().lock())?;
        return Ok(0);
    };

    match inspector.two_phase(&cli.filter_pattern, &extract, cli.next_filter.as_deref())? {
        TwoPhaseOutcome::NoRecords => {
            print_no_logs(&cli.filter_pattern, &window, app_config);
            Ok(0)
        }
        TwoPhaseOutcome::NotFound => {
            eprintln!("no extractable value found from initial logs");
            Ok(constants::EXIT_NOT_FOUND)
        }
        TwoPhaseOutcome::Extracted(value) => {
            export::write_extracted(&value, io::stdout().lock())?;
            Ok(0)
        }
        TwoPhaseOutcome::Followed { filter, records, .. } => {
            tracing::info!(filter = %filter, records = records.len(), "Follow-up search complete");
            export::write_json(&records, pretty, io::stdout().lock())?;
            Ok(0)
        }
    }
}

fn print_no_logs(pattern: &str, window: &TimeWindow, app_config: &AppConfig) {
    println!(
        "No logs found for the given pattern `{pattern}` {}",
        window.describe(app_config.default_window_hours)
    );
}
