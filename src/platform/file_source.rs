// LogInspector - platform/file_source.rs
//
// File-backed `PagedQuery`: each source is a directory under a root, each
// stream is a `*.log` / `*.jsonl` file inside it, and each line is a JSON
// object `{"timestamp": <epoch ms>, "message": "<text>"}`.
//
// Source names may look like CloudWatch log groups ("/aws/lambda/api");
// leading slashes are dropped and the remaining components are joined under
// the root. ".." components are rejected.
//
// Filter patterns follow a subset of the CloudWatch Logs text syntax:
//   - `%regex%`          regex match on the message
//   - `term "a phrase"`  every term must appear (case-sensitive)
//   - `?a ?b`            at least one `?` term must appear
//
// A first-page call reads every stream file in the source and keeps the
// sorted, filtered events as a snapshot keyed by (source, filter, window).
// Later pages slice that snapshot, so the token is simply the offset of the
// next page and a source is read once per search rather than once per page.
// The snapshot is dropped when its last page is served. Lines appended
// mid-pagination show up on the next first-page call. Unparseable lines are
// skipped and logged at debug.

use crate::core::model::{QueryPage, RawEvent};
use crate::core::pager::PagedQuery;
use crate::util::constants::STREAM_FILE_EXTENSIONS;
use crate::util::error::{BoxError, SourceError};
use regex::Regex;
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// One line of a stream file.
#[derive(Debug, serde::Deserialize)]
struct StreamLine {
    timestamp: i64,
    message: String,
}

// =============================================================================
// Filter pattern
// =============================================================================

/// A compiled filter pattern.
#[derive(Debug, Clone)]
pub enum FilterPattern {
    /// `%regex%` form.
    Regex(Regex),
    /// Term form: all `required` must appear; if `any_of` is non-empty, at
    /// least one of them must appear too.
    Terms {
        required: Vec<String>,
        any_of: Vec<String>,
    },
}

impl FilterPattern {
    pub fn parse(pattern: &str) -> Result<Self, SourceError> {
        let trimmed = pattern.trim();
        if trimmed.len() >= 2 && trimmed.starts_with('%') && trimmed.ends_with('%') {
            let body = &trimmed[1..trimmed.len() - 1];
            return Regex::new(body)
                .map(Self::Regex)
                .map_err(|source| SourceError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                });
        }

        let mut required = Vec::new();
        let mut any_of = Vec::new();
        for token in tokenize(trimmed) {
            match token.strip_prefix('?') {
                Some(rest) if !rest.is_empty() => any_of.push(unquote(rest)),
                _ => required.push(unquote(&token)),
            }
        }
        Ok(Self::Terms { required, any_of })
    }

    pub fn matches(&self, message: &str) -> bool {
        match self {
            Self::Regex(re) => re.is_match(message),
            Self::Terms { required, any_of } => {
                required.iter().all(|t| message.contains(t.as_str()))
                    && (any_of.is_empty() || any_of.iter().any(|t| message.contains(t.as_str())))
            }
        }
    }
}

/// Split on whitespace, keeping double-quoted phrases (quotes included) intact.
fn tokenize(pattern: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in pattern.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn unquote(token: &str) -> String {
    token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(token)
        .to_string()
}

// =============================================================================
// FileSource
// =============================================================================

/// (source, filter, start_ms, end_ms) of one paginated query.
type SnapshotKey = (String, String, i64, i64);

/// Serves sources from directories under `root`, `page_size` events at a time.
#[derive(Debug)]
pub struct FileSource {
    root: PathBuf,
    page_size: usize,
    snapshots: Mutex<HashMap<SnapshotKey, Arc<Vec<RawEvent>>>>,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>, page_size: usize) -> Self {
        Self {
            root: root.into(),
            page_size: page_size.max(1),
            snapshots: Mutex::new(HashMap::new()),
        }
    }

    fn snapshots(&self) -> MutexGuard<'_, HashMap<SnapshotKey, Arc<Vec<RawEvent>>>> {
        self.snapshots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot for `key`: rebuilt on the first page, reused afterwards.
    fn snapshot(
        &self,
        key: &SnapshotKey,
        first_page: bool,
    ) -> Result<Arc<Vec<RawEvent>>, SourceError> {
        if !first_page {
            if let Some(cached) = self.snapshots().get(key) {
                return Ok(Arc::clone(cached));
            }
        }

        let (source, filter, start_ms, end_ms) = key;
        let pattern = FilterPattern::parse(filter)?;
        let events = Arc::new(self.load_events(source, &pattern, *start_ms, *end_ms)?);
        self.snapshots().insert(key.clone(), Arc::clone(&events));
        Ok(events)
    }

    /// Map a source name to its directory under the root.
    fn source_dir(&self, source: &str) -> Result<PathBuf, SourceError> {
        let relative = Path::new(source.trim_start_matches('/'));
        let mut dir = self.root.clone();
        let mut depth = 0usize;
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    dir.push(part);
                    depth += 1;
                }
                Component::CurDir => {}
                _ => {
                    return Err(SourceError::InvalidName {
                        source_id: source.to_string(),
                    })
                }
            }
        }
        if depth == 0 {
            return Err(SourceError::InvalidName {
                source_id: source.to_string(),
            });
        }
        Ok(dir)
    }

    /// Every matching event in `source` within the window, sorted by
    /// (timestamp, stream). Lines keep file order within equal keys.
    fn load_events(
        &self,
        source: &str,
        pattern: &FilterPattern,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<RawEvent>, SourceError> {
        let dir = self.source_dir(source)?;
        if !dir.exists() {
            return Err(SourceError::NotFound { path: dir });
        }
        if !dir.is_dir() {
            return Err(SourceError::NotADirectory { path: dir });
        }

        let mut events = Vec::new();
        for path in stream_files(&dir)? {
            let stream = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            read_stream(&path, &stream, pattern, start_ms, end_ms, &mut events)?;
        }

        events.sort_by(|a, b| {
            a.timestamp_ms
                .cmp(&b.timestamp_ms)
                .then_with(|| a.stream.cmp(&b.stream))
        });
        Ok(events)
    }
}

impl PagedQuery for FileSource {
    fn query(
        &self,
        source: &str,
        filter: &str,
        start_ms: i64,
        end_ms: i64,
        token: Option<&str>,
    ) -> Result<QueryPage, BoxError> {
        let offset = match token {
            None => 0,
            Some(t) => t.parse::<usize>().map_err(|_| SourceError::InvalidToken {
                token: t.to_string(),
            })?,
        };

        let key: SnapshotKey = (source.to_string(), filter.to_string(), start_ms, end_ms);
        let events = self.snapshot(&key, token.is_none())?;

        let total = events.len();
        let page_end = offset.saturating_add(self.page_size).min(total);
        let page: Vec<RawEvent> = if offset < total {
            events[offset..page_end].to_vec()
        } else {
            Vec::new()
        };
        let next_token = (page_end < total).then(|| page_end.to_string());
        if next_token.is_none() {
            self.snapshots().remove(&key);
        }

        tracing::trace!(source, offset, returned = page.len(), total, "File source page");

        Ok(QueryPage {
            events: page,
            next_token,
        })
    }
}

/// Stream files directly inside `dir`, sorted by name.
fn stream_files(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let mut files = Vec::new();
    let walker = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|source| SourceError::Traversal {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_stream = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| STREAM_FILE_EXTENSIONS.contains(&ext));
        if is_stream {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// Append matching events from one stream file to `out`.
fn read_stream(
    path: &Path,
    stream: &str,
    pattern: &FilterPattern,
    start_ms: i64,
    end_ms: i64,
    out: &mut Vec<RawEvent>,
) -> Result<(), SourceError> {
    let io_err = |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::open(path).map_err(io_err)?;

    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(io_err)?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: StreamLine = match serde_json::from_str(&line) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(
                    file = %path.display(),
                    line = idx + 1,
                    error = %e,
                    "Skipping unparseable stream line"
                );
                continue;
            }
        };
        if parsed.timestamp < start_ms || parsed.timestamp > end_ms {
            continue;
        }
        if !pattern.matches(&parsed.message) {
            continue;
        }
        out.push(RawEvent {
            timestamp_ms: parsed.timestamp,
            stream: Some(stream.to_string()),
            message: parsed.message,
        });
    }
    Ok(())
}
