//! Enrollment model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::course::Course;
use crate::models::user::UserSummary;

/// Enrollment entity — the authoritative join record between a user and a
/// course
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
    /// Completion percentage, 0-100
    pub progress: i32,
    pub completed: bool,
}

/// Payload for enrolling a user in a course
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub user_id: Uuid,
    pub course_id: Uuid,
}

/// Enrollment expanded with its course and a user summary for listings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentDetails {
    pub id: Uuid,
    pub enrolled_at: DateTime<Utc>,
    pub progress: i32,
    pub completed: bool,
    pub course: Course,
    pub user: UserSummary,
}
