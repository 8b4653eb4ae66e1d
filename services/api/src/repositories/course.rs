//! Course repository for database operations

use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::{error, info};
use uuid::Uuid;

use crate::catalog::{CourseFilter, like_pattern};
use crate::error::{ApiError, ApiResult};
use crate::models::{Course, Level, NewCourse};

/// Fallback image applied to courses created without one
const DEFAULT_COURSE_IMAGE: &str =
    "https://images.unsplash.com/photo-1555066931-4365d14bab8c?w=400";

/// Course repository
#[derive(Clone)]
pub struct CourseRepository {
    pool: PgPool,
}

impl CourseRepository {
    /// Create a new course repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a course; new courses are published immediately
    pub async fn create(&self, new_course: &NewCourse) -> ApiResult<Course> {
        info!("Creating new course: {}", new_course.title);

        let now = Utc::now();
        let row = sqlx::query(
            r#"
            INSERT INTO courses (id, title, description, instructor, category, price,
                                 duration, level, image, is_published, enrolled_students,
                                 created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, '{}', $10, $11, $11)
            RETURNING id, title, description, instructor, category, price, duration,
                      level, image, is_published, enrolled_students, created_by,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_course.title)
        .bind(&new_course.description)
        .bind(&new_course.instructor)
        .bind(&new_course.category)
        .bind(new_course.price)
        .bind(&new_course.duration)
        .bind(new_course.level.as_str())
        .bind(new_course.image.as_deref().unwrap_or(DEFAULT_COURSE_IMAGE))
        .bind(new_course.created_by)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        map_course(&row)
    }

    /// Find a course by ID, published or not
    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<Course>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, instructor, category, price, duration,
                   level, image, is_published, enrolled_students, created_by,
                   created_at, updated_at
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_course).transpose()
    }

    /// List all published courses, newest first
    pub async fn list_published(&self) -> ApiResult<Vec<Course>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, instructor, category, price, duration,
                   level, image, is_published, enrolled_students, created_by,
                   created_at, updated_at
            FROM courses
            WHERE is_published = TRUE
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_course).collect()
    }

    /// Search published courses with the validated filter
    ///
    /// Every supplied criterion composes with AND; price bounds are
    /// inclusive and the text match is a case-insensitive substring over
    /// title, description, and instructor.
    pub async fn search(&self, filter: &CourseFilter) -> ApiResult<Vec<Course>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, title, description, instructor, category, price, duration, \
             level, image, is_published, enrolled_students, created_by, \
             created_at, updated_at \
             FROM courses WHERE is_published = TRUE",
        );

        if let Some(text) = &filter.text {
            let pattern = like_pattern(text);
            builder.push(" AND (title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR instructor ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        if let Some(category) = &filter.category {
            builder.push(" AND category = ");
            builder.push_bind(category.clone());
        }

        if let Some(level) = filter.level {
            builder.push(" AND level = ");
            builder.push_bind(level.as_str());
        }

        if let Some(min_price) = filter.min_price {
            builder.push(" AND price >= ");
            builder.push_bind(min_price);
        }

        if let Some(max_price) = filter.max_price {
            builder.push(" AND price <= ");
            builder.push_bind(max_price);
        }

        builder.push(" ORDER BY ");
        builder.push(filter.sort.order_by_sql());

        let rows = builder.build().fetch_all(&self.pool).await?;

        rows.iter().map(map_course).collect()
    }

    /// Distinct categories among published courses, for filter UIs
    pub async fn distinct_categories(&self) -> ApiResult<Vec<String>> {
        let categories = sqlx::query_scalar(
            r#"
            SELECT DISTINCT category
            FROM courses
            WHERE is_published = TRUE
            ORDER BY category
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Distinct levels among published courses, for filter UIs
    pub async fn distinct_levels(&self) -> ApiResult<Vec<String>> {
        let levels = sqlx::query_scalar(
            r#"
            SELECT DISTINCT level
            FROM courses
            WHERE is_published = TRUE
            ORDER BY level
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(levels)
    }

    /// Publish every unpublished course; returns the number updated
    pub async fn publish_all(&self) -> ApiResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE courses
            SET is_published = TRUE, updated_at = $1
            WHERE is_published = FALSE
            "#,
        )
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!("Published {} courses", result.rows_affected());
        Ok(result.rows_affected())
    }
}

/// Map a database row to a course entity
pub(crate) fn map_course(row: &PgRow) -> ApiResult<Course> {
    let level: String = row.get("level");
    let level = level.parse::<Level>().map_err(|e| {
        error!("Invalid level stored in database: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Course {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        instructor: row.get("instructor"),
        category: row.get("category"),
        price: row.get("price"),
        duration: row.get("duration"),
        level,
        image: row.get("image"),
        is_published: row.get("is_published"),
        enrolled_students: row.get("enrolled_students"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
