// LogInspector - core/pager.rs
//
// Per-source pagination. Drives a `PagedQuery` backend until the source is
// exhausted and converts every returned event into a `LogRecord`.
//
// Termination:
//   - an absent or empty next token ends the source;
//   - a next token equal to the token just sent ends the source (a backend
//     that keeps answering with the same cursor would otherwise loop forever);
//   - MAX_PAGES_PER_SOURCE caps backends that cycle through several tokens.

use crate::core::model::{LogRecord, QueryPage};
use crate::util::constants::MAX_PAGES_PER_SOURCE;
use crate::util::error::{BoxError, InspectorError};

/// A paginated log-event backend.
///
/// Implementations are shared by every search worker, so they must be safe
/// to call from several threads at once.
pub trait PagedQuery: Send + Sync {
    /// Fetch one page of events from `source` that match `filter` within
    /// `[start_ms, end_ms]`. `token` is `None` for the first page.
    fn query(
        &self,
        source: &str,
        filter: &str,
        start_ms: i64,
        end_ms: i64,
        token: Option<&str>,
    ) -> Result<QueryPage, BoxError>;
}

/// Fetch every matching event from one source.
///
/// A backend error aborts immediately; records gathered from earlier pages
/// are dropped and the error is returned as `InspectorError::Query`.
pub fn fetch_all(
    query: &dyn PagedQuery,
    source: &str,
    filter: &str,
    start_ms: i64,
    end_ms: i64,
) -> Result<Vec<LogRecord>, InspectorError> {
    let mut records: Vec<LogRecord> = Vec::new();
    let mut token: Option<String> = None;
    let mut pages: usize = 0;

    loop {
        let QueryPage { events, next_token } = query
            .query(source, filter, start_ms, end_ms, token.as_deref())
            .map_err(|e| InspectorError::Query {
                source_id: source.to_string(),
                source: e,
            })?;
        pages += 1;

        tracing::trace!(source, page = pages, events = events.len(), "Page fetched");

        records.extend(events.into_iter().map(|e| LogRecord::from_event(source, e)));

        let next = match next_token {
            Some(next) if !next.is_empty() => next,
            _ => break,
        };

        if token.as_deref() == Some(next.as_str()) {
            tracing::debug!(source, page = pages, "Backend repeated continuation token; stopping");
            break;
        }

        if pages >= MAX_PAGES_PER_SOURCE {
            tracing::warn!(
                source,
                pages,
                records = records.len(),
                "Page limit reached; remaining pages not fetched"
            );
            break;
        }

        token = Some(next);
    }

    tracing::debug!(source, pages, records = records.len(), "Source exhausted");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::RawEvent;
    use std::sync::Mutex;

    /// Replays a fixed list of page responses and records the tokens it saw.
    struct Scripted {
        pages: Mutex<Vec<Result<QueryPage, String>>>,
        seen_tokens: Mutex<Vec<Option<String>>>,
    }

    impl Scripted {
        fn new(pages: Vec<Result<QueryPage, String>>) -> Self {
            Self {
                pages: Mutex::new(pages.into_iter().rev().collect()),
                seen_tokens: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen_tokens.lock().unwrap().len()
        }
    }

    impl PagedQuery for Scripted {
        fn query(
            &self,
            _source: &str,
            _filter: &str,
            _start_ms: i64,
            _end_ms: i64,
            token: Option<&str>,
        ) -> Result<QueryPage, BoxError> {
            self.seen_tokens
                .lock()
                .unwrap()
                .push(token.map(str::to_string));
            match self.pages.lock().unwrap().pop() {
                Some(Ok(page)) => Ok(page),
                Some(Err(msg)) => Err(msg.into()),
                None => panic!("backend called after its last scripted page"),
            }
        }
    }

    fn event(ms: i64, msg: &str) -> RawEvent {
        RawEvent {
            timestamp_ms: ms,
            stream: Some("s".into()),
            message: msg.into(),
        }
    }

    fn page(events: Vec<RawEvent>, next: Option<&str>) -> Result<QueryPage, String> {
        Ok(QueryPage {
            events,
            next_token: next.map(str::to_string),
        })
    }

    #[test]
    fn test_follows_tokens_until_none() {
        let backend = Scripted::new(vec![
            page(vec![event(1, "a")], Some("t1")),
            page(vec![event(2, "b")], Some("t2")),
            page(vec![event(3, "c")], None),
        ]);
        let records = fetch_all(&backend, "g", "x", 0, 10).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(
            *backend.seen_tokens.lock().unwrap(),
            vec![None, Some("t1".to_string()), Some("t2".to_string())]
        );
    }

    #[test]
    fn test_empty_token_ends_pagination() {
        let backend = Scripted::new(vec![page(vec![event(1, "a")], Some(""))]);
        let records = fetch_all(&backend, "g", "x", 0, 10).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(backend.calls(), 1);
    }

    #[test]
    fn test_repeated_token_terminates() {
        // The second response echoes the token it was called with. Without
        // the guard the pager would call a third time and hit the panic.
        let backend = Scripted::new(vec![
            page(vec![event(1, "a")], Some("same")),
            page(vec![event(2, "b")], Some("same")),
        ]);
        let records = fetch_all(&backend, "g", "x", 0, 10).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(backend.calls(), 2);
    }

    #[test]
    fn test_error_aborts_without_partial_results() {
        let backend = Scripted::new(vec![
            page(vec![event(1, "a")], Some("t1")),
            Err("access denied".to_string()),
        ]);
        let err = fetch_all(&backend, "grp", "x", 0, 10).unwrap_err();
        match err {
            InspectorError::Query { source_id, source } => {
                assert_eq!(source_id, "grp");
                assert_eq!(source.to_string(), "access denied");
            }
            other => panic!("expected Query error, got {other:?}"),
        }
    }

    #[test]
    fn test_events_converted_verbatim() {
        let backend = Scripted::new(vec![page(
            vec![RawEvent {
                timestamp_ms: 1_500,
                stream: None,
                message: "{\"k\":1}".into(),
            }],
            None,
        )]);
        let records = fetch_all(&backend, "grp", "x", 0, 10).unwrap();
        assert_eq!(records[0].source, "grp");
        assert_eq!(records[0].stream, "");
        assert_eq!(records[0].message, "{\"k\":1}");
        assert_eq!(records[0].timestamp.timestamp_millis(), 1_500);
    }
}
