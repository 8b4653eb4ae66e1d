//! Course model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Difficulty level of a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    /// String form stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" => Ok(Level::Advanced),
            other => Err(format!("Unknown level: {}", other)),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Course entity
///
/// `instructor` is a display name, not a user reference. The
/// `enrolled_students` roster is denormalized; the enrollments table is the
/// authoritative join record and both are written in one transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub category: String,
    pub price: f64,
    pub duration: String,
    pub level: Level,
    pub image: String,
    pub is_published: bool,
    pub enrolled_students: Vec<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a course
///
/// Required fields are optional here so that missing values produce a
/// validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub instructor: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<String>,
    pub level: Option<String>,
    pub image: Option<String>,
    pub created_by: Option<Uuid>,
}

/// Validated course creation payload handed to the repository
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub category: String,
    pub price: f64,
    pub duration: String,
    pub level: Level,
    pub image: Option<String>,
    pub created_by: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_round_trip() {
        for level in [Level::Beginner, Level::Intermediate, Level::Advanced] {
            assert_eq!(level.as_str().parse::<Level>().unwrap(), level);
        }
    }

    #[test]
    fn test_unknown_level_is_rejected() {
        assert!("expert".parse::<Level>().is_err());
        assert!("Beginner".parse::<Level>().is_err());
    }

    #[test]
    fn test_course_serializes_with_wire_field_names() {
        let course = Course {
            id: Uuid::new_v4(),
            title: "Web Development Bootcamp".to_string(),
            description: "Full-stack web development".to_string(),
            instructor: "Sarah Johnson".to_string(),
            category: "Web Development".to_string(),
            price: 99.0,
            duration: "12 weeks".to_string(),
            level: Level::Beginner,
            image: String::new(),
            is_published: true,
            enrolled_students: vec![],
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&course).unwrap();
        assert_eq!(json["isPublished"], true);
        assert_eq!(json["level"], "beginner");
        assert!(json["enrolledStudents"].as_array().unwrap().is_empty());
    }
}
