//! Repository for create/list operations on enrollment entities

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::database::Database;
use super::schema::{Schema, SCHEMA_VERSION};
use crate::config::DatabaseSettings;
use crate::error::{EnrollmentError, PersistenceError, Result};
use crate::model::{
    Course, CourseId, LegacyUser, NewCourse, NewLegacyUser, NewStudent, Student, StudentDict,
    StudentId,
};

const STUDENT_COLUMNS: &str = "id, name, email, course_id, enrollment_date";

/// Record counts shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(rename = "total_alunos")]
    pub total_students: u64,
    #[serde(rename = "total_cursos")]
    pub total_courses: u64,
}

/// Repository for persisting enrollment records
#[derive(Debug)]
pub struct Repository {
    db: Database,
}

impl Repository {
    /// Connect using the given settings and make sure the schema exists
    pub fn connect(settings: &DatabaseSettings) -> Result<Self> {
        Self::with_database(Database::connect(settings)?)
    }

    /// Create a repository over a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_database(Database::file(path)?)
    }

    /// Create an in-memory repository (for testing)
    pub fn in_memory() -> Result<Self> {
        Self::with_database(Database::in_memory()?)
    }

    fn with_database(db: Database) -> Result<Self> {
        let repo = Self { db };
        repo.initialize()?;
        Ok(repo)
    }

    /// Initialize the database schema.
    ///
    /// Safe to call on every start; does nothing once the current version is
    /// recorded. A database written by a newer schema is refused.
    pub fn initialize(&self) -> Result<()> {
        self.db.with_connection(|conn| {
            let current_version = Self::schema_version(conn)?;

            if current_version == 0 {
                conn.execute_batch(Schema::create_tables())?;
                Self::set_schema_version(conn, SCHEMA_VERSION)?;
                tracing::info!(version = SCHEMA_VERSION, "Created database schema");
            } else if current_version > SCHEMA_VERSION {
                return Err(PersistenceError::Migration(format!(
                    "database schema version {} is newer than supported version {}",
                    current_version, SCHEMA_VERSION
                ))
                .into());
            }

            Ok(())
        })
    }

    /// Latest recorded schema version, 0 for a fresh database
    fn schema_version(conn: &Connection) -> Result<u32> {
        let has_table: bool = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master \
             WHERE type = 'table' AND name = 'schema_version')",
            [],
            |row| row.get(0),
        )?;
        if !has_table {
            return Ok(0);
        }

        let version = conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY rowid DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(version.unwrap_or(0))
    }

    fn set_schema_version(conn: &Connection, version: u32) -> Result<()> {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )?;
        Ok(())
    }

    /// Run `op` against a connection of this repository
    pub(crate) fn with_connection<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        self.db.with_connection(op)
    }

    // ==================== Legacy User Operations ====================

    /// Append a legacy user
    pub fn insert_legacy_user(&self, user: &NewLegacyUser) -> Result<LegacyUser> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO legacy_users (name, email) VALUES (?1, ?2)",
                params![user.name, user.email],
            )?;

            Ok(LegacyUser {
                id: conn.last_insert_rowid(),
                name: user.name.clone(),
                email: user.email.clone(),
            })
        })
    }

    /// Get all legacy users in insertion order
    pub fn list_legacy_users(&self) -> Result<Vec<LegacyUser>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT id, name, email FROM legacy_users ORDER BY id")?;
            let users = stmt
                .query_map([], |row| {
                    Ok(LegacyUser {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(users)
        })
    }

    // ==================== Course Operations ====================

    /// Insert a course
    pub fn insert_course(&self, course: &NewCourse) -> Result<Course> {
        self.with_connection(|conn| Self::insert_course_with(conn, course))
    }

    /// Insert a course on an existing connection or transaction
    pub(crate) fn insert_course_with(conn: &Connection, course: &NewCourse) -> Result<Course> {
        conn.execute(
            "INSERT INTO courses (name, duration_months) VALUES (?1, ?2)",
            params![course.name, course.duration_months],
        )?;

        Ok(Course {
            id: CourseId(conn.last_insert_rowid()),
            name: course.name.clone(),
            duration_months: course.duration_months,
        })
    }

    /// Get a course by ID
    pub fn get_course(&self, id: CourseId) -> Result<Option<Course>> {
        self.with_connection(|conn| {
            let course = conn
                .query_row(
                    "SELECT id, name, duration_months FROM courses WHERE id = ?1",
                    [id.0],
                    Self::row_to_course,
                )
                .optional()?;
            Ok(course)
        })
    }

    /// Get a course by ID, failing with `NotFound` when it does not exist
    pub fn require_course(&self, id: CourseId) -> Result<Course> {
        self.get_course(id)?
            .ok_or_else(|| EnrollmentError::NotFound(format!("Course {} not found", id)))
    }

    /// Get all courses in insertion order
    pub fn list_courses(&self) -> Result<Vec<Course>> {
        self.with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, duration_months FROM courses ORDER BY id")?;
            let courses = stmt
                .query_map([], Self::row_to_course)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(courses)
        })
    }

    /// Number of stored courses
    pub fn count_courses(&self) -> Result<u64> {
        self.with_connection(Self::count_courses_with)
    }

    pub(crate) fn count_courses_with(conn: &Connection) -> Result<u64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn row_to_course(row: &rusqlite::Row) -> rusqlite::Result<Course> {
        Ok(Course {
            id: CourseId(row.get(0)?),
            name: row.get(1)?,
            duration_months: row.get(2)?,
        })
    }

    // ==================== Student Operations ====================

    /// Enroll a student.
    ///
    /// Fails with a constraint violation on a duplicate email or an unknown
    /// course; no row is written in that case.
    pub fn insert_student(&self, student: &NewStudent) -> Result<Student> {
        let enrollment_date = student
            .enrollment_date
            .unwrap_or_else(|| Utc::now().date_naive());

        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO students (name, email, course_id, enrollment_date) VALUES (?1, ?2, ?3, ?4)",
                params![
                    student.name,
                    student.email,
                    student.course_id.map(|id| id.0),
                    enrollment_date,
                ],
            )?;

            let id = StudentId(conn.last_insert_rowid());
            tracing::debug!(%id, email = %student.email, "Enrolled student");

            Ok(Student {
                id,
                name: student.name.clone(),
                email: student.email.clone(),
                course_id: student.course_id,
                enrollment_date: Some(enrollment_date),
            })
        })
    }

    /// Get a student by ID
    pub fn get_student(&self, id: StudentId) -> Result<Option<Student>> {
        self.with_connection(|conn| {
            let student = conn
                .query_row(
                    &format!("SELECT {} FROM students WHERE id = ?1", STUDENT_COLUMNS),
                    [id.0],
                    Self::row_to_student,
                )
                .optional()?;
            Ok(student)
        })
    }

    /// Get all students in insertion order
    pub fn list_students(&self) -> Result<Vec<Student>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM students ORDER BY id",
                STUDENT_COLUMNS
            ))?;
            let students = stmt
                .query_map([], Self::row_to_student)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(students)
        })
    }

    /// Students enrolled in a course
    pub fn students_in_course(&self, course_id: CourseId) -> Result<Vec<Student>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM students WHERE course_id = ?1 ORDER BY id",
                STUDENT_COLUMNS
            ))?;
            let students = stmt
                .query_map([course_id.0], Self::row_to_student)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(students)
        })
    }

    /// Number of stored students
    pub fn count_students(&self) -> Result<u64> {
        self.with_connection(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?;
            Ok(count.max(0) as u64)
        })
    }

    /// Look up the course a student references, if any
    pub fn course_of(&self, student: &Student) -> Result<Option<Course>> {
        match student.course_id {
            Some(id) => self.get_course(id),
            None => Ok(None),
        }
    }

    /// Client mapping of one student, with its course resolved
    pub fn student_dict(&self, student: &Student) -> Result<StudentDict> {
        let course = self.course_of(student)?;
        Ok(student.to_dict(course.as_ref()))
    }

    /// Client mappings of all students, courses resolved with a single join
    pub fn student_dicts(&self) -> Result<Vec<StudentDict>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT s.id, s.name, s.email, s.course_id, s.enrollment_date, c.id, c.name, c.duration_months
                 FROM students s LEFT JOIN courses c ON c.id = s.course_id
                 ORDER BY s.id",
            )?;
            let dicts = stmt
                .query_map([], |row| {
                    let student = Self::row_to_student(row)?;
                    let course_id: Option<i64> = row.get(5)?;
                    let course = match course_id {
                        Some(id) => Some(Course {
                            id: CourseId(id),
                            name: row.get(6)?,
                            duration_months: row.get(7)?,
                        }),
                        None => None,
                    };
                    Ok(student.to_dict(course.as_ref()))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(dicts)
        })
    }

    fn row_to_student(row: &rusqlite::Row) -> rusqlite::Result<Student> {
        let course_id: Option<i64> = row.get(3)?;
        Ok(Student {
            id: StudentId(row.get(0)?),
            name: row.get(1)?,
            email: row.get(2)?,
            course_id: course_id.map(CourseId),
            enrollment_date: row.get(4)?,
        })
    }

    // ==================== Aggregates ====================

    /// Student and course totals
    pub fn statistics(&self) -> Result<Statistics> {
        Ok(Statistics {
            total_students: self.count_students()?,
            total_courses: self.count_courses()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_repository_creation() {
        let repo = Repository::in_memory().unwrap();
        assert!(repo.list_legacy_users().unwrap().is_empty());
        assert!(repo.list_courses().unwrap().is_empty());
        assert!(repo.list_students().unwrap().is_empty());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let repo = Repository::in_memory().unwrap();
        repo.insert_course(&NewCourse::new("Redes", 12)).unwrap();

        repo.initialize().unwrap();
        repo.initialize().unwrap();

        assert_eq!(repo.count_courses().unwrap(), 1);
        let versions: i64 = repo
            .with_connection(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(versions, 1);
    }

    #[test]
    fn test_unreadable_schema_version_is_an_error() {
        let repo = Repository::in_memory().unwrap();
        repo.with_connection(|conn| {
            conn.execute("INSERT INTO schema_version (version) VALUES ('corrupt')", [])?;
            Ok(())
        })
        .unwrap();

        assert!(repo.initialize().is_err());

        let versions: i64 = repo
            .with_connection(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(versions, 2);
    }

    #[test]
    fn test_newer_schema_version_refused() {
        let repo = Repository::in_memory().unwrap();
        repo.with_connection(|conn| Repository::set_schema_version(conn, SCHEMA_VERSION + 1))
            .unwrap();

        let err = repo.initialize().unwrap_err();
        assert!(matches!(
            err,
            EnrollmentError::Persistence(PersistenceError::Migration(_))
        ));
    }

    #[test]
    fn test_legacy_user_insert_and_list() {
        let repo = Repository::in_memory().unwrap();

        let user = repo
            .insert_legacy_user(&NewLegacyUser::new("Maria", "maria@example.com"))
            .unwrap();

        let all = repo.list_legacy_users().unwrap();
        assert_eq!(all, vec![user.clone()]);
        assert!(user.id > 0);
        assert_eq!(user.name, "Maria");
    }

    #[test]
    fn test_legacy_users_allow_duplicate_email() {
        let repo = Repository::in_memory().unwrap();
        repo.insert_legacy_user(&NewLegacyUser::new("A", "same@example.com"))
            .unwrap();
        repo.insert_legacy_user(&NewLegacyUser::new("B", "same@example.com"))
            .unwrap();

        let names: Vec<_> = repo
            .list_legacy_users()
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_course_crud() {
        let repo = Repository::in_memory().unwrap();

        let course = repo.insert_course(&NewCourse::new("Gestão de TI", 24)).unwrap();

        let loaded = repo.get_course(course.id).unwrap().unwrap();
        assert_eq!(loaded, course);
        assert!(repo.get_course(CourseId(999)).unwrap().is_none());

        assert_eq!(repo.require_course(course.id).unwrap(), loaded);
        assert!(matches!(
            repo.require_course(CourseId(999)),
            Err(EnrollmentError::NotFound(_))
        ));
        assert_eq!(repo.list_courses().unwrap().len(), 1);
    }

    #[test]
    fn test_course_constraints() {
        let repo = Repository::in_memory().unwrap();

        let err = repo.insert_course(&NewCourse::new("Zero", 0)).unwrap_err();
        assert!(err.is_constraint_violation());

        let err = repo.insert_course(&NewCourse::new("", 6)).unwrap_err();
        assert!(err.is_constraint_violation());

        assert_eq!(repo.count_courses().unwrap(), 0);
    }

    #[test]
    fn test_student_duplicate_email_rejected() {
        let repo = Repository::in_memory().unwrap();

        repo.insert_student(&NewStudent::new("Ana", "ana@example.com"))
            .unwrap();
        let err = repo
            .insert_student(&NewStudent::new("Ana Clone", "ana@example.com"))
            .unwrap_err();

        assert!(err.is_constraint_violation());
        assert_eq!(repo.count_students().unwrap(), 1);
    }

    #[test]
    fn test_student_unknown_course_rejected() {
        let repo = Repository::in_memory().unwrap();

        let err = repo
            .insert_student(&NewStudent::new("Caio", "caio@example.com").with_course(CourseId(42)))
            .unwrap_err();

        assert!(err.is_constraint_violation());
        assert_eq!(repo.count_students().unwrap(), 0);
    }

    #[test]
    fn test_student_default_enrollment_date() {
        let repo = Repository::in_memory().unwrap();
        let today = Utc::now().date_naive();

        let student = repo
            .insert_student(&NewStudent::new("Duda", "duda@example.com"))
            .unwrap();

        let loaded = repo.get_student(student.id).unwrap().unwrap();
        let date = loaded.enrollment_date.unwrap();
        assert!(date >= today && date <= Utc::now().date_naive());
    }

    #[test]
    fn test_student_course_relationship() {
        let repo = Repository::in_memory().unwrap();
        let course = repo
            .insert_course(&NewCourse::new("Desenvolvimento de Sistemas", 18))
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let enrolled = repo
            .insert_student(
                &NewStudent::new("Eva", "eva@example.com")
                    .with_course(course.id)
                    .with_enrollment_date(date),
            )
            .unwrap();
        let unaffiliated = repo
            .insert_student(&NewStudent::new("Fabio", "fabio@example.com"))
            .unwrap();

        assert_eq!(repo.course_of(&enrolled).unwrap(), Some(course.clone()));
        assert_eq!(repo.course_of(&unaffiliated).unwrap(), None);

        let in_course = repo.students_in_course(course.id).unwrap();
        assert_eq!(in_course, vec![enrolled.clone()]);

        let dict = repo.student_dict(&enrolled).unwrap();
        assert_eq!(dict.course_name.as_deref(), Some("Desenvolvimento de Sistemas"));
        assert_eq!(dict.enrollment_date.as_deref(), Some("2024-01-15"));
    }

    #[test]
    fn test_student_dicts_join() {
        let repo = Repository::in_memory().unwrap();
        let course = repo.insert_course(&NewCourse::new("Gestão de TI", 24)).unwrap();
        repo.insert_student(&NewStudent::new("Gil", "gil@example.com").with_course(course.id))
            .unwrap();
        repo.insert_student(&NewStudent::new("Hana", "hana@example.com"))
            .unwrap();

        let dicts = repo.student_dicts().unwrap();
        assert_eq!(dicts.len(), 2);
        assert_eq!(dicts[0].course_name.as_deref(), Some("Gestão de TI"));
        assert_eq!(dicts[1].course_name, None);
        assert_eq!(dicts[1].name, "Hana");
    }

    #[test]
    fn test_statistics() {
        let repo = Repository::in_memory().unwrap();
        repo.insert_course(&NewCourse::new("Redes", 12)).unwrap();
        repo.insert_student(&NewStudent::new("Igor", "igor@example.com"))
            .unwrap();
        repo.insert_student(&NewStudent::new("Julia", "julia@example.com"))
            .unwrap();

        let stats = repo.statistics().unwrap();
        assert_eq!(stats.total_students, 2);
        assert_eq!(stats.total_courses, 1);

        let value = serde_json::to_value(stats).unwrap();
        assert_eq!(value, serde_json::json!({"total_alunos": 2, "total_cursos": 1}));
    }
}
