use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod catalog;
mod error;
mod models;
mod quiz;
mod repositories;
mod routes;
mod schema;
mod state;
mod validation;

use common::database::{DatabaseConfig, init_pool};

use crate::quiz::QuizService;
use crate::repositories::{
    CourseRepository, EnrollmentRepository, StatsRepository, UserRepository,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting LearnPro API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Create tables and indexes when missing
    schema::init_schema(&pool).await?;

    info!("LearnPro API service initialized successfully");

    // Initialize repositories
    let user_repository = UserRepository::new(pool.clone());
    let course_repository = CourseRepository::new(pool.clone());
    let enrollment_repository = EnrollmentRepository::new(pool.clone());
    let stats_repository = StatsRepository::new(pool);
    let quiz_service = QuizService::new();

    let app_state = AppState {
        user_repository,
        course_repository,
        enrollment_repository,
        stats_repository,
        quiz_service,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("LearnPro API listening on 0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
