// LogInspector - platform/config.rs
//
// Platform-specific directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::export::OutputFormat;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogInspector data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/loginspector/).
    pub config_dir: PathBuf,

    /// Data directory; the file-backed sources live under it by default.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }

    /// Default root directory for the file-backed sources.
    pub fn default_source_root(&self) -> PathBuf {
        self.data_dir.join(constants::SOURCES_DIR_NAME)
    }

    /// Path of the default config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[search]` section.
    pub search: SearchSection,
    /// `[source]` section.
    pub source: SourceSection,
    /// `[output]` section.
    pub output: OutputSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[search]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SearchSection {
    /// Worker threads per search.
    pub concurrency: Option<usize>,
    /// Look-back window when no --start/--end is given.
    pub default_window_hours: Option<i64>,
}

/// `[source]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SourceSection {
    /// Root directory of the file-backed sources.
    pub root: Option<String>,
    /// Events per page.
    pub page_size: Option<usize>,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// "text", "json", or "csv".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub concurrency: usize,
    pub default_window_hours: i64,
    /// `None` means the platform default source root.
    pub source_root: Option<PathBuf>,
    pub page_size: usize,
    pub output_format: OutputFormat,
    pub pretty: bool,
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            concurrency: constants::DEFAULT_CONCURRENCY,
            default_window_hours: constants::DEFAULT_WINDOW_HOURS,
            source_root: None,
            page_size: constants::DEFAULT_PAGE_SIZE,
            output_format: OutputFormat::default(),
            pretty: false,
            log_level: None,
        }
    }
}

/// Load config.toml from its default platform location.
///
/// A missing file yields defaults with no warnings (first run). An unreadable
/// or unparseable file yields defaults plus a warning; the search still runs.
pub fn load_config(paths: &PlatformPaths) -> (AppConfig, Vec<String>) {
    let config_path = paths.config_file();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    match load_config_file(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            (AppConfig::default(), vec![msg])
        }
    }
}

/// Load and validate an explicitly named config file.
///
/// Unlike [`load_config`], read and parse failures are errors: the user
/// asked for this file.
pub fn load_config_file(path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let raw: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), "Loaded config.toml");
    Ok(validate(raw))
}

/// Validate each field against named constants, accumulating all warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    // -- Search: concurrency --
    if let Some(n) = raw.search.concurrency {
        if (1..=constants::ABSOLUTE_MAX_CONCURRENCY).contains(&n) {
            config.concurrency = n;
        } else {
            warnings.push(format!(
                "[search] concurrency = {n} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_CONCURRENCY,
                constants::DEFAULT_CONCURRENCY,
            ));
        }
    }

    // -- Search: default_window_hours --
    if let Some(hours) = raw.search.default_window_hours {
        if (1..=constants::MAX_WINDOW_HOURS).contains(&hours) {
            config.default_window_hours = hours;
        } else {
            warnings.push(format!(
                "[search] default_window_hours = {hours} is out of range (1-{}). Using default ({}).",
                constants::MAX_WINDOW_HOURS,
                constants::DEFAULT_WINDOW_HOURS,
            ));
        }
    }

    // -- Source: root --
    if let Some(root) = raw.source.root {
        if !root.is_empty() {
            config.source_root = Some(PathBuf::from(root));
        }
    }

    // -- Source: page_size --
    if let Some(size) = raw.source.page_size {
        if (constants::MIN_PAGE_SIZE..=constants::MAX_PAGE_SIZE).contains(&size) {
            config.page_size = size;
        } else {
            warnings.push(format!(
                "[source] page_size = {size} is out of range ({}-{}). Using default ({}).",
                constants::MIN_PAGE_SIZE,
                constants::MAX_PAGE_SIZE,
                constants::DEFAULT_PAGE_SIZE,
            ));
        }
    }

    // -- Output: format --
    if let Some(ref name) = raw.output.format {
        match OutputFormat::from_name(name) {
            Some(format) => config.output_format = format,
            None => warnings.push(format!(
                "[output] format = \"{name}\" is not recognised. \
                 Valid values: text, json, csv. Using default (text).",
            )),
        }
    }

    if let Some(pretty) = raw.output.pretty {
        config.pretty = pretty;
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default ({}).",
                constants::DEFAULT_LOG_LEVEL,
            ));
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}
