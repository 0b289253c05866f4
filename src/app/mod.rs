// LogInspector - app/mod.rs
//
// Application layer: search coordination, two-phase workflow, time window.
// Dependencies: core layer.
// Must NOT depend on: platform specifics.

pub mod inspector;
pub mod search;
pub mod window;
