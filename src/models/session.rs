// file: src/models/session.rs
// description: opaque per-upload session identifier
// reference: https://docs.rs/uuid

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Groups the resumes uploaded together in one batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
