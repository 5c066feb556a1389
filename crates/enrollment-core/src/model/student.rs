//! Student entity and its reference to a course

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::course::{Course, CourseId};

/// Storage-assigned student identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub i64);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A person enrolled, optionally, in one course
///
/// The course is held by key only. Resolving it is a storage lookup
/// (`Repository::course_of`) or a join (`Repository::student_dicts`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub course_id: Option<CourseId>,
    pub enrollment_date: Option<NaiveDate>,
}

/// Fields accepted when enrolling a student
///
/// `enrollment_date` falls back to the current UTC date on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub course_id: Option<CourseId>,
    pub enrollment_date: Option<NaiveDate>,
}

impl NewStudent {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            course_id: None,
            enrollment_date: None,
        }
    }

    pub fn with_course(mut self, course_id: CourseId) -> Self {
        self.course_id = Some(course_id);
        self
    }

    pub fn with_enrollment_date(mut self, date: NaiveDate) -> Self {
        self.enrollment_date = Some(date);
        self
    }
}

/// Plain mapping of a student as exposed to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDict {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "curso_id")]
    pub course_id: Option<i64>,
    #[serde(rename = "curso_nome")]
    pub course_name: Option<String>,
    #[serde(rename = "data_matricula")]
    pub enrollment_date: Option<String>,
}

impl Student {
    /// Build the client mapping, resolving the course name from `course`.
    ///
    /// A course whose id differs from `course_id` is ignored.
    pub fn to_dict(&self, course: Option<&Course>) -> StudentDict {
        let course_name = course
            .filter(|c| Some(c.id) == self.course_id)
            .map(|c| c.name.clone());

        StudentDict {
            id: self.id.0,
            name: self.name.clone(),
            email: self.email.clone(),
            course_id: self.course_id.map(|id| id.0),
            course_name,
            enrollment_date: self
                .enrollment_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}
