//! Schema bootstrap for the LearnPro database
//!
//! Tables and indexes are created at startup when missing. IDs and
//! timestamps are generated in Rust and bound explicitly, so no database
//! extension is required.

use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use tracing::info;

/// Create the LearnPro tables and indexes if they do not exist yet
pub async fn init_schema(pool: &PgPool) -> DatabaseResult<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'student',
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS courses (
            id UUID PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            instructor TEXT NOT NULL,
            category TEXT NOT NULL,
            price DOUBLE PRECISION NOT NULL DEFAULT 0,
            duration TEXT NOT NULL,
            level TEXT NOT NULL DEFAULT 'beginner',
            image TEXT NOT NULL DEFAULT '',
            is_published BOOLEAN NOT NULL DEFAULT FALSE,
            enrolled_students UUID[] NOT NULL DEFAULT '{}',
            created_by UUID REFERENCES users (id),
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS enrollments (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users (id),
            course_id UUID NOT NULL REFERENCES courses (id),
            enrolled_at TIMESTAMPTZ NOT NULL,
            progress INTEGER NOT NULL DEFAULT 0,
            completed BOOLEAN NOT NULL DEFAULT FALSE,
            UNIQUE (user_id, course_id)
        )
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_courses_is_published
        ON courses (is_published)
        "#,
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(DatabaseError::Query)?;
    }

    info!("Database schema is up to date");
    Ok(())
}
