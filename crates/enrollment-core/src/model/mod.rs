//! Entity definitions
//!
//! Two independent entity groups live here: the Course/Student pair, linked
//! by `Student::course_id`, and the standalone legacy user records behind the
//! form page. Nothing bridges the two groups.

mod course;
mod legacy_user;
mod student;

pub use course::{Course, CourseDict, CourseId, NewCourse};
pub use legacy_user::{LegacyUser, NewLegacyUser};
pub use student::{NewStudent, Student, StudentDict, StudentId};
