//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{CreateCourseRequest, Level, NewCourse};

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    if name.len() > 128 {
        return Err("Name must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate a course creation payload
///
/// Title, description, instructor, category, and duration are required and
/// must not be blank; the price, when given, must be non-negative. The
/// price defaults to 0 and the level to `beginner`.
pub fn validate_course(request: &CreateCourseRequest) -> Result<NewCourse, String> {
    let title = required_field("title", request.title.as_deref())?;
    let description = required_field("description", request.description.as_deref())?;
    let instructor = required_field("instructor", request.instructor.as_deref())?;
    let category = required_field("category", request.category.as_deref())?;
    let duration = required_field("duration", request.duration.as_deref())?;

    let price = request.price.unwrap_or(0.0);
    if !price.is_finite() || price < 0.0 {
        return Err("price must be a non-negative number".to_string());
    }

    let level = match request.level.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        Some(level) => level.parse::<Level>()?,
        None => Level::Beginner,
    };

    let image = request
        .image
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .map(String::from);

    Ok(NewCourse {
        title,
        description,
        instructor,
        category,
        price,
        duration,
        level,
        image,
        created_by: request.created_by,
    })
}

fn required_field(field: &str, value: Option<&str>) -> Result<String, String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => Ok(value.to_string()),
        None => Err(format!("{} is required", field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course_request() -> CreateCourseRequest {
        CreateCourseRequest {
            title: Some("Web Development Bootcamp".to_string()),
            description: Some("Learn full-stack web development".to_string()),
            instructor: Some("Sarah Johnson".to_string()),
            category: Some("Web Development".to_string()),
            price: Some(99.0),
            duration: Some("12 weeks".to_string()),
            level: Some("beginner".to_string()),
            image: None,
            created_by: None,
        }
    }

    #[test]
    fn test_valid_email() {
        assert!(validate_email("student@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.domain.org").is_ok());
    }

    #[test]
    fn test_invalid_email() {
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn test_password_length_bounds() {
        assert!(validate_password("longenough1").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn test_name_required() {
        assert!(validate_name("Ada Lovelace").is_ok());
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn test_complete_course_request_passes() {
        let new_course = validate_course(&course_request()).unwrap();
        assert_eq!(new_course.title, "Web Development Bootcamp");
        assert_eq!(new_course.price, 99.0);
        assert_eq!(new_course.level, Level::Beginner);
    }

    #[test]
    fn test_course_defaults_apply() {
        let mut request = course_request();
        request.price = None;
        request.level = None;
        request.image = Some("   ".to_string());

        let new_course = validate_course(&request).unwrap();
        assert_eq!(new_course.price, 0.0);
        assert_eq!(new_course.level, Level::Beginner);
        assert_eq!(new_course.image, None);
    }

    #[test]
    fn test_missing_required_course_field_fails() {
        let mut request = course_request();
        request.duration = None;
        assert!(validate_course(&request).is_err());

        let mut request = course_request();
        request.title = Some("   ".to_string());
        assert!(validate_course(&request).is_err());
    }

    #[test]
    fn test_negative_course_price_fails() {
        let mut request = course_request();
        request.price = Some(-1.0);
        assert!(validate_course(&request).is_err());
    }

    #[test]
    fn test_unknown_course_level_fails() {
        let mut request = course_request();
        request.level = Some("expert".to_string());
        assert!(validate_course(&request).is_err());
    }
}
