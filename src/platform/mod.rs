// LogInspector - platform/mod.rs
//
// Platform abstraction layer: config directories and the file-backed source.
// Dependencies: core model and pager trait, directories, walkdir.

pub mod config;
pub mod file_source;
