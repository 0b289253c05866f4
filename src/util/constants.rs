// LogInspector - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogInspector";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogInspector";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Search limits
// =============================================================================

/// Default number of worker threads used to search sources in parallel.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Hard upper bound on worker threads (prevents configuration mistakes).
pub const ABSOLUTE_MAX_CONCURRENCY: usize = 64;

/// Default look-back window when neither --start nor --end is given.
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// Largest configurable default window (one year).
pub const MAX_WINDOW_HOURS: i64 = 24 * 366;

/// Upper bound on pages fetched from a single source in one search.
///
/// The repeated-token guard catches a backend that returns the same token
/// twice in a row; this ceiling catches one that cycles through several.
pub const MAX_PAGES_PER_SOURCE: usize = 10_000;

// =============================================================================
// File source limits
// =============================================================================

/// Events served per page by the file-backed source.
pub const DEFAULT_PAGE_SIZE: usize = 1_000;

/// Minimum configurable page size.
pub const MIN_PAGE_SIZE: usize = 1;

/// Maximum configurable page size (matches the CloudWatch Logs API ceiling).
pub const MAX_PAGE_SIZE: usize = 10_000;

/// File extensions treated as stream files inside a source directory.
pub const STREAM_FILE_EXTENSIONS: &[&str] = &["log", "jsonl"];

/// Default directory (relative to the data dir) holding file-backed sources.
pub const SOURCES_DIR_NAME: &str = "sources";

// =============================================================================
// Filter building
// =============================================================================

/// Field name under which the extracted value is exposed to --next-filter.
pub const NEXT_FILTER_VALUE_FIELD: &str = "value";

/// Field name used to wrap messages that are not valid JSON.
pub const RAW_MESSAGE_FIELD: &str = "message";

// =============================================================================
// Config and logging
// =============================================================================

/// Name of the optional configuration file.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default tracing level. Results go to stdout, so the default is quiet.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

// =============================================================================
// Process exit codes
// =============================================================================

/// Runtime failure (search error, config error, output error).
pub const EXIT_FAILURE: i32 = 1;

/// Invalid command-line usage.
pub const EXIT_USAGE: i32 = 2;

/// --extract found no value in the first search's results.
pub const EXIT_NOT_FOUND: i32 = 3;
