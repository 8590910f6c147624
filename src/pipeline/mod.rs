// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod orchestrator;
mod progress;

pub use orchestrator::{HiringAssistant, SearchQuery};
pub use progress::{ProgressTracker, UploadStats};
