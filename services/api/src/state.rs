//! Application state shared across handlers

use crate::quiz::QuizService;
use crate::repositories::{
    CourseRepository, EnrollmentRepository, StatsRepository, UserRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_repository: UserRepository,
    pub course_repository: CourseRepository,
    pub enrollment_repository: EnrollmentRepository,
    pub stats_repository: StatsRepository,
    pub quiz_service: QuizService,
}
