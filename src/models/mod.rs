// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod document;
pub mod search_result;
pub mod session;
pub mod upload;

pub use document::{ResumeDocument, ResumeMetadata};
pub use search_result::{SearchOutcome, SearchResult};
pub use session::SessionId;
pub use upload::{FileFailure, UploadReport, UploadedFile};
