// LogInspector - core/mod.rs
//
// Core business logic layer: data model, pagination, merge, extraction,
// filter building, output rendering.
// Must NOT depend on: app or platform.

pub mod export;
pub mod extract;
pub mod filter_builder;
pub mod merge;
pub mod model;
pub mod pager;
pub mod query;
