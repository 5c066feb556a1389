//! # enrollment-core
//!
//! Data layer for a small student-enrollment record keeper.
//!
//! ## Entities
//!
//! - **Course**: a named program of study with a fixed duration in months
//! - **Student**: a person enrolled, optionally, in one course; emails are
//!   unique
//! - **Legacy user**: an independent name/email record used by the form page
//!
//! ## Layers
//!
//! - [`model`] declares the entities and their client mappings (`to_dict`)
//! - [`persistence`] owns the SQLite schema, connections, and the
//!   [`Repository`] with its create/list operations
//! - [`seed`] inserts the default courses into an empty database, once
//! - [`config`] resolves [`Settings`] from a profile and the environment

pub mod config;
pub mod error;
pub mod model;
pub mod persistence;
pub mod seed;

pub use config::{DatabaseSettings, PoolSettings, Profile, Settings};
pub use error::{ConfigError, EnrollmentError, PersistenceError, Result};
pub use model::{
    Course, CourseDict, CourseId, LegacyUser, NewCourse, NewLegacyUser, NewStudent, Student,
    StudentDict, StudentId,
};
pub use persistence::{Repository, Statistics};
pub use seed::{seed_courses, SeedOutcome, DEFAULT_COURSES};
