// LogInspector - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::error::ValidationError;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::HashSet;

// =============================================================================
// Log Record (normalised output of a search)
// =============================================================================

/// A single log event matched in one source.
///
/// Field order is significant: the derived `Ord` compares timestamp, then
/// source, then stream, then message, which is the merge order of a search.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LogRecord {
    /// Event time in UTC, millisecond precision.
    pub timestamp: DateTime<Utc>,

    /// Identifier of the source (log group) the event came from.
    pub source: String,

    /// Stream within the source. Empty when the backend reported none.
    pub stream: String,

    /// Raw message text, unmodified.
    pub message: String,
}

impl LogRecord {
    /// Build a record from a backend event belonging to `source`.
    pub fn from_event(source: &str, event: RawEvent) -> Self {
        Self {
            timestamp: millis_to_utc(event.timestamp_ms),
            source: source.to_string(),
            stream: event.stream.unwrap_or_default(),
            message: event.message,
        }
    }
}

/// Convert epoch milliseconds to a UTC instant.
///
/// Values outside chrono's representable range collapse to the Unix epoch.
pub fn millis_to_utc(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

// =============================================================================
// Paged query wire types
// =============================================================================

/// One event as returned by a paged query backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Event time as epoch milliseconds.
    pub timestamp_ms: i64,

    /// Stream name, if the backend reports one.
    pub stream: Option<String>,

    /// Message text.
    pub message: String,
}

/// A single page of results plus the token for the next page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPage {
    pub events: Vec<RawEvent>,

    /// Opaque continuation token. `None` or empty means no more pages.
    pub next_token: Option<String>,
}

// =============================================================================
// Search request
// =============================================================================

/// A validated multi-source search request.
///
/// Constructed fresh per search through [`SearchRequest::new`]; the fields
/// are read-only afterwards.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    sources: Vec<String>,
    filter_expression: String,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
}

impl SearchRequest {
    /// Validate and build a request.
    ///
    /// Rejects an empty source list, an empty filter expression, duplicate
    /// sources, and a window whose start lies after its end.
    pub fn new(
        sources: Vec<String>,
        filter_expression: impl Into<String>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let filter_expression = filter_expression.into();

        if sources.is_empty() {
            return Err(ValidationError::NoSources);
        }
        if filter_expression.is_empty() {
            return Err(ValidationError::EmptyFilter);
        }

        let mut seen = HashSet::with_capacity(sources.len());
        for source in &sources {
            if !seen.insert(source.as_str()) {
                return Err(ValidationError::DuplicateSource {
                    source_id: source.clone(),
                });
            }
        }

        if window_start > window_end {
            return Err(ValidationError::InvertedWindow {
                start: window_start,
                end: window_end,
            });
        }

        Ok(Self {
            sources,
            filter_expression,
            window_start,
            window_end,
        })
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn filter_expression(&self) -> &str {
        &self.filter_expression
    }

    pub fn window_start(&self) -> DateTime<Utc> {
        self.window_start
    }

    pub fn window_end(&self) -> DateTime<Utc> {
        self.window_end
    }

    /// Window start as epoch milliseconds, as sent to the backend.
    pub fn start_ms(&self) -> i64 {
        self.window_start.timestamp_millis()
    }

    /// Window end as epoch milliseconds, as sent to the backend.
    pub fn end_ms(&self) -> i64 {
        self.window_end.timestamp_millis()
    }
}
