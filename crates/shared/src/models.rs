use serde::{Deserialize, Serialize};

use crate::assigner::AssignmentResult;

pub const ASSIGNMENT_FILE_VERSION: &str = "1.0";

/// A saved assignment run, as written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentFile {
    pub version: String,
    pub created_at: String,
    /// Where the cases came from (file path or "manual entry")
    pub source: String,
    pub result: AssignmentResult,
}

impl AssignmentFile {
    pub fn new(source: impl Into<String>, result: AssignmentResult) -> Self {
        Self {
            version: ASSIGNMENT_FILE_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            source: source.into(),
            result,
        }
    }
}
