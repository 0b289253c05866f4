// LogInspector - app/search.rs
//
// Multi-source search coordination. Fans the request's sources out across a
// fixed pool of worker threads and merges what comes back.
//
// Architecture:
//   - Sources sit in a shared queue; each worker pops one, pages through it
//     with `pager::fetch_all`, and reports a `WorkerOutcome` over an mpsc
//     channel. A source is popped exactly once, so no two workers share one.
//   - An `Arc<AtomicBool>` cancel flag stops further dequeues after the
//     first failure. Calls already in flight run to completion; their sends
//     fail once the coordinator has returned and the output is dropped.
//   - The coordinator returns the first error it receives without waiting
//     for other workers. On success it merges every batch.
//
// Panics: a panicking backend call is reported as a query error for its
// source. This relies on unwinding; under the release profile's
// `panic = "abort"` the process aborts instead.
//
// Ordering: workers finish in any order. Output order comes from
// `merge::merge` alone.

use crate::core::merge;
use crate::core::model::{LogRecord, SearchRequest};
use crate::core::pager::{self, PagedQuery};
use crate::util::error::{InspectorError, Result};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Instant;

/// Message from a worker to the coordinator.
enum WorkerOutcome {
    Records {
        source: String,
        records: Vec<LogRecord>,
    },
    Failed(InspectorError),
}

/// Everything a worker needs, cloned once per thread.
#[derive(Clone)]
struct WorkerContext {
    query: Arc<dyn PagedQuery>,
    queue: Arc<Mutex<VecDeque<String>>>,
    cancel: Arc<AtomicBool>,
    filter: Arc<str>,
    start_ms: i64,
    end_ms: i64,
}

/// Number of worker threads for `source_count` sources.
///
/// Always at least one, never more than there are sources.
pub fn effective_workers(concurrency: usize, source_count: usize) -> usize {
    concurrency.min(source_count).max(1)
}

/// Search every source in `request` and return the merged records.
///
/// Fails fast: the first source error is returned and no records are.
pub fn search(
    query: Arc<dyn PagedQuery>,
    request: &SearchRequest,
    concurrency: usize,
) -> Result<Vec<LogRecord>> {
    let source_count = request.sources().len();
    let workers = effective_workers(concurrency, source_count);
    let started = Instant::now();

    tracing::info!(
        sources = source_count,
        workers,
        filter = request.filter_expression(),
        start = %request.window_start(),
        end = %request.window_end(),
        "Search started"
    );

    let (tx, rx) = mpsc::channel::<WorkerOutcome>();
    let ctx = WorkerContext {
        query,
        queue: Arc::new(Mutex::new(request.sources().iter().cloned().collect())),
        cancel: Arc::new(AtomicBool::new(false)),
        filter: Arc::from(request.filter_expression()),
        start_ms: request.start_ms(),
        end_ms: request.end_ms(),
    };

    let mut spawned = 0usize;
    for worker_id in 0..workers {
        let worker_ctx = ctx.clone();
        let worker_tx = tx.clone();
        let result = std::thread::Builder::new()
            .name(format!("search-worker-{worker_id}"))
            .spawn(move || run_worker(worker_id, worker_ctx, worker_tx));
        match result {
            Ok(_) => spawned += 1,
            Err(e) => {
                tracing::warn!(worker_id, error = %e, "Failed to spawn search worker");
            }
        }
    }

    if spawned == 0 {
        // No threads available; drain the queue on the calling thread.
        tracing::warn!("No search workers could be spawned; searching sequentially");
        run_worker(0, ctx.clone(), tx.clone());
    }

    // Drop the coordinator's sender so `recv` ends once all workers exit.
    drop(tx);

    let mut batches: Vec<Vec<LogRecord>> = Vec::with_capacity(source_count);
    while let Ok(outcome) = rx.recv() {
        match outcome {
            WorkerOutcome::Records { source, records } => {
                tracing::debug!(source = %source, records = records.len(), "Source completed");
                batches.push(records);
            }
            WorkerOutcome::Failed(e) => {
                ctx.cancel.store(true, Ordering::SeqCst);
                tracing::warn!(error = %e, "Search aborted on source failure");
                return Err(e);
            }
        }
    }

    let merged = merge::merge(batches);

    tracing::info!(
        records = merged.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Search complete"
    );

    Ok(merged)
}

/// Worker loop: pop sources until the queue is empty or the search is cancelled.
fn run_worker(worker_id: usize, ctx: WorkerContext, tx: mpsc::Sender<WorkerOutcome>) {
    loop {
        if ctx.cancel.load(Ordering::SeqCst) {
            tracing::trace!(worker_id, "Search cancelled; worker exiting");
            return;
        }

        let next = ctx
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        let Some(source) = next else {
            return;
        };

        tracing::debug!(worker_id, source = %source, "Searching source");

        let fetched = panic::catch_unwind(AssertUnwindSafe(|| {
            pager::fetch_all(
                ctx.query.as_ref(),
                &source,
                &ctx.filter,
                ctx.start_ms,
                ctx.end_ms,
            )
        }));

        let outcome = match fetched {
            Ok(Ok(records)) => WorkerOutcome::Records { source, records },
            Ok(Err(e)) => WorkerOutcome::Failed(e),
            Err(_) => WorkerOutcome::Failed(InspectorError::Query {
                source_id: source,
                source: "paged query panicked".into(),
            }),
        };

        let failed = matches!(outcome, WorkerOutcome::Failed(_));
        if tx.send(outcome).is_err() {
            // Coordinator already returned; this output is discarded.
            return;
        }
        if failed {
            return;
        }
    }
}
