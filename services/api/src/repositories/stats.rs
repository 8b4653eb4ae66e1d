//! Platform statistics aggregation

use serde::Serialize;
use sqlx::PgPool;

use crate::error::ApiResult;

/// Aggregated platform counters for the admin dashboard
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_courses: i64,
    pub total_enrollments: i64,
    pub total_revenue: f64,
}

/// Stats repository
#[derive(Clone)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    /// Create a new stats repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Compute the platform statistics
    ///
    /// Revenue sums the current price of each enrollment's course at
    /// aggregation time; with zero enrollments the sum is 0, never an
    /// error.
    pub async fn compute(&self) -> ApiResult<PlatformStats> {
        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let total_courses: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await?;

        let total_enrollments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enrollments")
            .fetch_one(&self.pool)
            .await?;

        let total_revenue: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(c.price), 0)
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(PlatformStats {
            total_users,
            total_courses,
            total_enrollments,
            total_revenue,
        })
    }
}
