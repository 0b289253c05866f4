// LogInspector - lib.rs
//
// Library entry point, exposing the search engine, the two-phase workflow,
// and the file-backed source for integration testing and embedding.
//
// The command-line surface lives in `main.rs` and is not part of the
// library surface.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
