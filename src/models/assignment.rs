// src/models/assignment.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DOC_TYPE_ASSIGNMENT: &str = "assignment";
pub const STATUS_ASSIGNED: &str = "assigned";
pub const STATUS_COMPLETED: &str = "completed";

/// The test snapshot embedded in an assignment document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSnapshot {
    pub id: String,
    pub name: String,
    pub category: String,
    pub grade: Option<i64>,
    pub link: Option<String>,
    pub question_count: Option<i64>,
    pub is_special: bool,
}

/// An assignment document in a `<nameKey>_odevler` partition.
///
/// Lifecycle: written with status `assigned` by the bulk-assign action,
/// flipped to `completed` (with `completedAt`) by the submission
/// reconciler, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDoc {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub status: String,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub test: TestSnapshot,
}

impl AssignmentDoc {
    pub fn new(test: TestSnapshot) -> Self {
        Self {
            doc_type: DOC_TYPE_ASSIGNMENT.to_string(),
            status: STATUS_ASSIGNED.to_string(),
            assigned_at: chrono::Utc::now(),
            completed_at: None,
            test,
        }
    }
}

/// Reference to a test selected on the assign screen.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssignTestRef {
    pub category: String,
    pub id: String,
}

/// DTO for the admin bulk-assign action: every selected student gets one
/// assignment document per selected test.
#[derive(Debug, Deserialize, Validate)]
pub struct AssignRequest {
    #[validate(length(min = 1))]
    pub students: Vec<String>,
    #[validate(length(min = 1))]
    pub tests: Vec<AssignTestRef>,
}
