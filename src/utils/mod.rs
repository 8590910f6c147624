// file: src/utils/mod.rs
// description: utility functions module exports
// reference: internal module structure

pub mod logging;
pub mod retry;
pub mod telemetry;
pub mod validation;

pub use retry::RetryPolicy;
pub use telemetry::{HealthReport, HealthStatus, ServiceCheck, StageTimer};
pub use validation::Validator;
