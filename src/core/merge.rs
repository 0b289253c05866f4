// LogInspector - core/merge.rs
//
// Deterministic merge of per-source record batches.

use crate::core::model::LogRecord;
use rayon::slice::ParallelSliceMut;

/// Concatenate `batches` and sort by (timestamp, source, stream, message).
///
/// Duplicates are kept. Records equal on all four keys are indistinguishable,
/// so an unstable sort still yields identical output for any batch order.
pub fn merge(batches: Vec<Vec<LogRecord>>) -> Vec<LogRecord> {
    let total = batches.iter().map(Vec::len).sum();
    let mut records = Vec::with_capacity(total);
    for batch in batches {
        records.extend(batch);
    }
    records.par_sort_unstable();
    records
}
