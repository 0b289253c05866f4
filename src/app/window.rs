// LogInspector - app/window.rs
//
// Resolution of the search time window from optional RFC3339 bounds.
//
// Rules:
//   - neither bound: the last `default_hours` ending at `now`
//   - only start:    end = now
//   - only end:      start = end - default_hours
//   - both:          used as given
// A start after the end is rejected.

use crate::util::error::WindowError;
use chrono::{DateTime, Duration, Utc};

/// A resolved `[start, end]` search window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// True when neither bound was given and the default look-back applies.
    pub is_default: bool,
}

impl TimeWindow {
    /// Human-readable description for "no logs found" messages.
    pub fn describe(&self, default_hours: i64) -> String {
        if self.is_default {
            format!("in the last {default_hours}h.")
        } else {
            format!(
                "between {} and {}.",
                self.start.format("%Y-%m-%dT%H:%M:%SZ"),
                self.end.format("%Y-%m-%dT%H:%M:%SZ")
            )
        }
    }
}

/// Resolve the window from optional `--start` / `--end` values.
pub fn resolve_window(
    start: Option<&str>,
    end: Option<&str>,
    now: DateTime<Utc>,
    default_hours: i64,
) -> Result<TimeWindow, WindowError> {
    let look_back = Duration::hours(default_hours);
    let start = start.filter(|s| !s.is_empty());
    let end = end.filter(|s| !s.is_empty());

    let (start_ts, end_ts) = match (start, end) {
        (None, None) => {
            return Ok(TimeWindow {
                start: now - look_back,
                end: now,
                is_default: true,
            });
        }
        (Some(s), None) => (parse_rfc3339("start", s)?, now),
        (None, Some(e)) => {
            let end_ts = parse_rfc3339("end", e)?;
            (end_ts - look_back, end_ts)
        }
        (Some(s), Some(e)) => (parse_rfc3339("start", s)?, parse_rfc3339("end", e)?),
    };

    if start_ts > end_ts {
        return Err(WindowError::StartAfterEnd {
            start: start_ts,
            end: end_ts,
        });
    }

    Ok(TimeWindow {
        start: start_ts,
        end: end_ts,
        is_default: false,
    })
}

fn parse_rfc3339(field: &'static str, value: &str) -> Result<DateTime<Utc>, WindowError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| WindowError::InvalidTimestamp {
            field,
            value: value.to_string(),
            source,
        })
}
