// file: src/exporter/mod.rs
// description: search report export module exports
// reference: internal module structure

pub mod json;

pub use json::{ExportedMatch, SearchReport, SearchReportExporter};
