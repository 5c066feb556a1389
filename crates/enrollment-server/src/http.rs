//! JSON endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use enrollment_core::{CourseDict, CourseId, EnrollmentError, NewStudent, Statistics, StudentDict};

use crate::AppState;

/// Error response: status plus `{"erro": message}`
pub type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(serde_json::json!({ "erro": message.into() })))
}

fn storage_error(err: EnrollmentError) -> ApiError {
    match err {
        EnrollmentError::MissingField(field) => api_error(
            StatusCode::BAD_REQUEST,
            format!("Missing required field: {}", field),
        ),
        EnrollmentError::NotFound(what) => api_error(StatusCode::NOT_FOUND, what),
        e if e.is_constraint_violation() => api_error(StatusCode::CONFLICT, e.to_string()),
        e => {
            tracing::error!("Request failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// List all courses
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CourseDict>>, ApiError> {
    let courses = state.repository.list_courses().map_err(storage_error)?;
    Ok(Json(courses.iter().map(|c| c.to_dict()).collect()))
}

/// Get a specific course
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<CourseDict>, ApiError> {
    let course = state
        .repository
        .require_course(CourseId(id))
        .map_err(storage_error)?;
    Ok(Json(course.to_dict()))
}

/// List the students enrolled in a course
pub async fn list_course_students(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<StudentDict>>, ApiError> {
    let course = state
        .repository
        .require_course(CourseId(id))
        .map_err(storage_error)?;

    let students = state
        .repository
        .students_in_course(course.id)
        .map_err(storage_error)?;

    Ok(Json(students.iter().map(|s| s.to_dict(Some(&course))).collect()))
}

/// List all students with their course names
pub async fn list_students(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StudentDict>>, ApiError> {
    let students = state.repository.student_dicts().map_err(storage_error)?;
    Ok(Json(students))
}

/// Request to enroll a student
#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "curso_id")]
    pub course_id: Option<i64>,
    #[serde(rename = "data_matricula")]
    pub enrollment_date: Option<NaiveDate>,
}

impl CreateStudentRequest {
    /// Check field presence and build the insert
    pub fn into_new_student(self) -> Result<NewStudent, EnrollmentError> {
        let name = required(self.name, "nome")?;
        let email = required(self.email, "email")?;

        Ok(NewStudent {
            name,
            email,
            course_id: self.course_id.map(CourseId),
            enrollment_date: self.enrollment_date,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, EnrollmentError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(EnrollmentError::MissingField(field.to_string())),
    }
}

/// Body rejections use the same `{"erro": ...}` shape as other failures
fn rejection_error(rejection: JsonRejection) -> ApiError {
    api_error(rejection.status(), rejection.body_text())
}

/// Enroll a student
pub async fn create_student(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateStudentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StudentDict>), ApiError> {
    let Json(request) = body.map_err(rejection_error)?;
    let new_student = request.into_new_student().map_err(storage_error)?;

    let student = state
        .repository
        .insert_student(&new_student)
        .map_err(storage_error)?;
    let dict = state
        .repository
        .student_dict(&student)
        .map_err(storage_error)?;

    tracing::info!(id = %student.id, "Enrolled student");
    Ok((StatusCode::CREATED, Json(dict)))
}

/// Get record totals
pub async fn get_statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Statistics>, ApiError> {
    let stats = state.repository.statistics().map_err(storage_error)?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_presence_checks() {
        let request: CreateStudentRequest =
            serde_json::from_value(serde_json::json!({"nome": "Ana"})).unwrap();
        let err = request.into_new_student().unwrap_err();
        assert!(matches!(err, EnrollmentError::MissingField(ref f) if f == "email"));

        let request: CreateStudentRequest =
            serde_json::from_value(serde_json::json!({"nome": "  ", "email": "a@x.io"})).unwrap();
        assert!(request.into_new_student().is_err());
    }

    #[test]
    fn test_request_maps_optional_fields() {
        let request: CreateStudentRequest = serde_json::from_value(serde_json::json!({
            "nome": "Ana",
            "email": "ana@example.com",
            "curso_id": 2,
            "data_matricula": "2024-01-15"
        }))
        .unwrap();

        let new = request.into_new_student().unwrap();
        assert_eq!(new.course_id, Some(CourseId(2)));
        assert_eq!(new.enrollment_date, NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn test_storage_error_status() {
        let (status, body) = storage_error(EnrollmentError::MissingField("nome".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.0["erro"].as_str().unwrap().contains("nome"));

        let constraint = EnrollmentError::Persistence(
            enrollment_core::PersistenceError::Constraint("UNIQUE constraint failed".into()),
        );
        assert_eq!(storage_error(constraint).0, StatusCode::CONFLICT);

        let (status, body) = storage_error(EnrollmentError::NotFound("Course 9 not found".into()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.0["erro"], "Course 9 not found");
    }
}
