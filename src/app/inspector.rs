// LogInspector - app/inspector.rs
//
// Search session bound to one backend, source list, and window, plus the
// two-phase workflow: search, extract a value, build a narrower filter,
// search again over the same sources and window.

use crate::app::search;
use crate::core::extract;
use crate::core::filter_builder;
use crate::core::model::{LogRecord, SearchRequest};
use crate::core::pager::PagedQuery;
use crate::core::query::QueryEvaluator;
use crate::util::error::{Result, ValidationError};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Split a comma-separated source list, trimming entries and dropping empties.
pub fn parse_source_list(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// --extract option
// =============================================================================

/// A parsed `--extract name=path` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSpec {
    /// Placeholder name substituted as `{{name}}` in the next filter.
    pub name: String,
    /// Query expression evaluated against each first-phase message.
    pub path: String,
}

impl ExtractSpec {
    /// Parse `name=path`, trimming both halves.
    pub fn parse(spec: &str) -> std::result::Result<Self, ValidationError> {
        let invalid = |reason| ValidationError::InvalidExtractSpec {
            spec: spec.to_string(),
            reason,
        };

        let eq = match spec.find('=') {
            Some(i) if i > 0 && i < spec.len() - 1 => i,
            _ => return Err(invalid("missing '=' or empty side")),
        };

        let name = spec[..eq].trim();
        let path = spec[eq + 1..].trim();
        if name.is_empty() || path.is_empty() {
            return Err(invalid("empty name or path"));
        }

        Ok(Self {
            name: name.to_string(),
            path: path.to_string(),
        })
    }
}

// =============================================================================
// Two-phase outcome
// =============================================================================

/// Result of [`Inspector::two_phase`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TwoPhaseOutcome {
    /// The first search matched nothing.
    NoRecords,
    /// The first search matched, but no message yielded a value.
    NotFound,
    /// A value was extracted and no follow-up filter was requested.
    Extracted(String),
    /// The follow-up search ran with `filter`.
    Followed {
        value: String,
        filter: String,
        records: Vec<LogRecord>,
    },
}

// =============================================================================
// Inspector
// =============================================================================

/// Searches a fixed set of sources over a fixed window.
pub struct Inspector {
    query: Arc<dyn PagedQuery>,
    evaluator: Box<dyn QueryEvaluator>,
    sources: Vec<String>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    concurrency: usize,
}

impl Inspector {
    pub fn new(
        query: Arc<dyn PagedQuery>,
        evaluator: Box<dyn QueryEvaluator>,
        sources: Vec<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        concurrency: usize,
    ) -> Self {
        Self {
            query,
            evaluator,
            sources,
            start,
            end,
            concurrency,
        }
    }

    /// Search every source for `filter` and return the merged records.
    pub fn search(&self, filter: &str) -> Result<Vec<LogRecord>> {
        let request = SearchRequest::new(self.sources.clone(), filter, self.start, self.end)?;
        search::search(Arc::clone(&self.query), &request, self.concurrency)
    }

    /// Run the two-phase workflow.
    ///
    /// With `next_filter`, the extracted value is substituted for
    /// `{{name}}`, the template is turned into a filter pattern, and a second
    /// search runs with it.
    pub fn two_phase(
        &self,
        first_filter: &str,
        extract: &ExtractSpec,
        next_filter: Option<&str>,
    ) -> Result<TwoPhaseOutcome> {
        let first = self.search(first_filter)?;
        if first.is_empty() {
            return Ok(TwoPhaseOutcome::NoRecords);
        }

        let messages = first.iter().map(|r| r.message.as_str());
        let value = match extract::extract_first(self.evaluator.as_ref(), messages, &extract.path)? {
            Some(v) => v,
            None => return Ok(TwoPhaseOutcome::NotFound),
        };

        let template = match next_filter {
            Some(t) => t,
            None => return Ok(TwoPhaseOutcome::Extracted(value)),
        };

        let substituted = filter_builder::substitute_placeholder(template, &extract.name, &value);
        let filter = filter_builder::build_filter(self.evaluator.as_ref(), &substituted, &value)?;

        tracing::info!(name = %extract.name, filter = %filter, "Running follow-up search");

        let records = self.search(&filter)?;
        Ok(TwoPhaseOutcome::Followed {
            value,
            filter,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_list() {
        assert_eq!(
            parse_source_list(" /aws/a , ,b,"),
            vec!["/aws/a".to_string(), "b".to_string()]
        );
        assert!(parse_source_list("").is_empty());
        assert!(parse_source_list(" , ").is_empty());
    }

    #[test]
    fn test_parse_extract_spec() {
        let spec = ExtractSpec::parse(" id = user.id ").unwrap();
        assert_eq!(spec.name, "id");
        assert_eq!(spec.path, "user.id");
    }

    #[test]
    fn test_parse_extract_spec_keeps_later_equals() {
        let spec = ExtractSpec::parse("q=a == `1`").unwrap();
        assert_eq!(spec.name, "q");
        assert_eq!(spec.path, "a == `1`");
    }

    #[test]
    fn test_parse_extract_spec_rejects_malformed() {
        for bad in ["", "noequals", "=path", "name=", " =path", "name= "] {
            assert!(
                matches!(
                    ExtractSpec::parse(bad),
                    Err(ValidationError::InvalidExtractSpec { .. })
                ),
                "expected rejection of {bad:?}"
            );
        }
    }
}
