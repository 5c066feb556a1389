//! Persistence layer for enrollment records
//!
//! Provides SQLite-backed storage for courses, students, and legacy users.

mod database;
mod repository;
mod schema;

pub use database::Database;
pub use repository::{Repository, Statistics};
pub use schema::{Schema, SCHEMA_VERSION};
