// file: src/extractor/mod.rs
// description: text and metadata extraction module exports
// reference: internal module structure

pub mod metadata;
pub mod patterns;
pub mod pdf;

pub use metadata::{MetadataExtractor, ResumeHeuristics};
pub use pdf::{PdfTextExtractor, TextExtractor, strip_nul};
