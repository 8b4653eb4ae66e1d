//! LearnPro API routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    catalog::{CourseFilter, CourseSearchParams},
    error::ApiError,
    models::{
        CreateCourseRequest, EnrollRequest, LoginRequest, RegisterRequest, Role, UpdateRoleRequest,
    },
    state::AppState,
    validation,
};

/// Request to start a quiz attempt
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartQuizRequest {
    pub user_id: Uuid,
}

/// Request to answer a quiz question
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerQuizRequest {
    pub user_id: Uuid,
    pub question: usize,
    pub answer: usize,
}

/// Request to submit a quiz attempt
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    pub user_id: Uuid,
}

/// Create the router for the LearnPro API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/courses", get(list_courses))
        .route("/courses/search", get(search_courses))
        .route("/courses/create", post(create_course))
        .route("/courses/:id", get(get_course))
        .route("/publish-courses", post(publish_courses))
        .route("/enroll", post(enroll))
        .route("/my-courses/:user_id", get(my_courses))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:user_id/role", put(update_user_role))
        .route("/admin/stats", get(admin_stats))
        .route("/quizzes", get(list_quizzes))
        .route("/quizzes/:id/start", post(start_quiz))
        .route("/quizzes/:id/answer", post(answer_quiz))
        .route("/quizzes/:id/submit", post(submit_quiz))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "learnpro-api"
    }))
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_name(&payload.name).map_err(ApiError::InvalidInput)?;
    validation::validate_email(&payload.email).map_err(ApiError::InvalidInput)?;
    validation::validate_password(&payload.password).map_err(ApiError::InvalidInput)?;

    let role = match payload.role.as_deref() {
        Some(role) => role.parse::<Role>().map_err(ApiError::InvalidInput)?,
        None => Role::Student,
    };

    let user = state
        .user_repository
        .create(payload.name.trim(), &payload.email, &payload.password, role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "user": user,
        })),
    ))
}

/// Verify credentials and return the user summary
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("Login attempt for: {}", payload.email);

    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::InvalidInput("Invalid email or password".to_string()))?;

    if !state.user_repository.verify_password(&user, &payload.password)? {
        return Err(ApiError::InvalidInput(
            "Invalid email or password".to_string(),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "user": user,
    })))
}

/// List all published courses
pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let courses = state.course_repository.list_published().await?;

    Ok(Json(json!({
        "success": true,
        "courses": courses,
    })))
}

/// Search published courses with filtering and sorting
///
/// Also returns the distinct categories and levels among published courses
/// so clients can populate their filter controls.
pub async fn search_courses(
    State(state): State<AppState>,
    Query(params): Query<CourseSearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = CourseFilter::from_params(&params)?;

    let courses = state.course_repository.search(&filter).await?;
    let categories = state.course_repository.distinct_categories().await?;
    let levels = state.course_repository.distinct_levels().await?;

    Ok(Json(json!({
        "success": true,
        "courses": courses,
        "filters": {
            "categories": categories,
            "levels": levels,
        },
    })))
}

/// Get a single course by ID
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let course = state
        .course_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "course": course,
    })))
}

/// Create a new course
pub async fn create_course(
    State(state): State<AppState>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new_course = validation::validate_course(&payload).map_err(ApiError::InvalidInput)?;

    // course creation is reserved for instructors and admins
    if let Some(creator_id) = new_course.created_by {
        let creator = state
            .user_repository
            .find_by_id(creator_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        if creator.role == Role::Student {
            return Err(ApiError::Unauthorized);
        }
    }

    let course = state.course_repository.create(&new_course).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Course created successfully",
            "course": course,
        })),
    ))
}

/// Publish every unpublished course
pub async fn publish_courses(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let published = state.course_repository.publish_all().await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Published {} courses", published),
    })))
}

/// Enroll a user in a course
pub async fn enroll(
    State(state): State<AppState>,
    Json(payload): Json<EnrollRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollment = state
        .enrollment_repository
        .enroll(payload.user_id, payload.course_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Enrolled successfully",
            "enrollment": enrollment,
        })),
    ))
}

/// List a user's enrollments with expanded course and user details
pub async fn my_courses(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollments = state.enrollment_repository.list_for_user(user_id).await?;

    Ok(Json(json!({
        "success": true,
        "enrollments": enrollments,
    })))
}

/// List all users
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = state.user_repository.list().await?;

    Ok(Json(json!({
        "success": true,
        "users": users,
    })))
}

/// Change a user's role
pub async fn update_user_role(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let role = payload.role.parse::<Role>().map_err(ApiError::InvalidInput)?;

    let user = state.user_repository.update_role(user_id, role).await?;

    Ok(Json(json!({
        "success": true,
        "message": "User role updated successfully",
        "user": user,
    })))
}

/// Aggregate platform statistics
pub async fn admin_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.stats_repository.compute().await?;

    Ok(Json(json!({
        "success": true,
        "stats": stats,
    })))
}

/// List the quiz bank
pub async fn list_quizzes(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "quizzes": state.quiz_service.quizzes(),
    }))
}

/// Start a quiz attempt, replacing any previous one for the user
pub async fn start_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Json(payload): Json<StartQuizRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (title, remaining_seconds, total_questions) =
        state.quiz_service.start(payload.user_id, &quiz_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Quiz started",
        "title": title,
        "timeRemaining": remaining_seconds,
        "totalQuestions": total_questions,
    })))
}

/// Record an answer on the user's active attempt
pub async fn answer_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Json(payload): Json<AnswerQuizRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let remaining_seconds = state
        .quiz_service
        .answer(payload.user_id, &quiz_id, payload.question, payload.answer)
        .await?;

    Ok(Json(json!({
        "success": true,
        "timeRemaining": remaining_seconds,
    })))
}

/// Submit the user's active attempt and return the graded result
pub async fn submit_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<String>,
    Json(payload): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.quiz_service.submit(payload.user_id, &quiz_id).await?;

    Ok(Json(json!({
        "success": true,
        "result": result,
    })))
}
