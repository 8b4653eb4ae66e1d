//! LearnPro repositories for database operations

pub mod course;
pub mod enrollment;
pub mod stats;
pub mod user;

// Re-export for convenience
pub use course::CourseRepository;
pub use enrollment::EnrollmentRepository;
pub use stats::{PlatformStats, StatsRepository};
pub use user::UserRepository;

/// True when the error is a PostgreSQL unique-constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505")
}
