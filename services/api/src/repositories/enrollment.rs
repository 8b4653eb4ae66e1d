//! Enrollment repository for database operations
//!
//! Enrollment is the one dual-write in the system: the `enrollments` table
//! is the authoritative join record, and `courses.enrolled_students` is a
//! denormalized roster. Both are written inside a single transaction so a
//! reader never observes the pair half-updated.

use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Course, Enrollment, EnrollmentDetails, UserSummary};
use crate::repositories::course::map_course;
use crate::repositories::is_unique_violation;

/// Enrollment repository
#[derive(Clone)]
pub struct EnrollmentRepository {
    pool: PgPool,
}

impl EnrollmentRepository {
    /// Create a new enrollment repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enroll a user in a course
    ///
    /// Fails with `NotFound` when either entity is missing and with
    /// `AlreadyExists` when an enrollment for the pair exists. The unique
    /// index on `(user_id, course_id)` serializes concurrent duplicate
    /// requests, so at most one enrollment per pair can ever be created.
    pub async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> ApiResult<Enrollment> {
        let mut tx = self.pool.begin().await?;

        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;
        if !user_exists {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        let course_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM courses WHERE id = $1)")
                .bind(course_id)
                .fetch_one(&mut *tx)
                .await?;
        if !course_exists {
            return Err(ApiError::NotFound("Course not found".to_string()));
        }

        let row = sqlx::query(
            r#"
            INSERT INTO enrollments (id, user_id, course_id, enrolled_at, progress, completed)
            VALUES ($1, $2, $3, $4, 0, FALSE)
            RETURNING id, user_id, course_id, enrolled_at, progress, completed
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(course_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::AlreadyExists("Already enrolled in this course".to_string())
            } else {
                e.into()
            }
        })?;

        // Keep the denormalized roster in step with the join table; the
        // containment guard makes the append idempotent under retries.
        sqlx::query(
            r#"
            UPDATE courses
            SET enrolled_students = array_append(enrolled_students, $1), updated_at = $3
            WHERE id = $2 AND NOT (enrolled_students @> ARRAY[$1])
            "#,
        )
        .bind(user_id)
        .bind(course_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!("User {} enrolled in course {}", user_id, course_id);
        Ok(map_enrollment(&row))
    }

    /// List a user's enrollments, each expanded with its course and a user
    /// summary (name and email only, never the password hash)
    pub async fn list_for_user(&self, user_id: Uuid) -> ApiResult<Vec<EnrollmentDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT e.id AS enrollment_id, e.enrolled_at, e.progress, e.completed,
                   c.id, c.title, c.description, c.instructor, c.category, c.price,
                   c.duration, c.level, c.image, c.is_published, c.enrolled_students,
                   c.created_by, c.created_at, c.updated_at,
                   u.id AS joined_user_id, u.name AS user_name, u.email AS user_email
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            JOIN users u ON u.id = e.user_id
            WHERE e.user_id = $1
            ORDER BY e.enrolled_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_enrollment_details).collect()
    }
}

/// Map a database row to an enrollment entity
fn map_enrollment(row: &PgRow) -> Enrollment {
    Enrollment {
        id: row.get("id"),
        user_id: row.get("user_id"),
        course_id: row.get("course_id"),
        enrolled_at: row.get("enrolled_at"),
        progress: row.get("progress"),
        completed: row.get("completed"),
    }
}

/// Map a joined row to an expanded enrollment
fn map_enrollment_details(row: &PgRow) -> ApiResult<EnrollmentDetails> {
    let course: Course = map_course(row)?;

    let user = UserSummary {
        id: row.get("joined_user_id"),
        name: row.get("user_name"),
        email: row.get("user_email"),
    };

    Ok(EnrollmentDetails {
        id: row.get("enrollment_id"),
        enrolled_at: row.get("enrolled_at"),
        progress: row.get("progress"),
        completed: row.get("completed"),
        course,
        user,
    })
}
