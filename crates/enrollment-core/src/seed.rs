//! One-time seeding of the default courses

use crate::error::Result;
use crate::model::{Course, NewCourse};
use crate::persistence::Repository;

/// Courses inserted into an empty database
pub const DEFAULT_COURSES: [(&str, u32); 2] = [
    ("Gestão de TI", 24),
    ("Desenvolvimento de Sistemas", 18),
];

/// Result of a seeding run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Courses were inserted, in insertion order
    Seeded(Vec<Course>),
    /// The table already held courses; nothing was written
    Skipped { existing: u64 },
    /// Seeding failed and was rolled back
    Failed(String),
}

impl SeedOutcome {
    /// Human-readable status lines for the seed entry point
    pub fn report(&self) -> Vec<String> {
        match self {
            SeedOutcome::Seeded(courses) => {
                let mut lines = vec![
                    "Initial courses inserted successfully!".to_string(),
                    String::new(),
                    "Available courses:".to_string(),
                ];
                lines.extend(courses.iter().map(|c| {
                    format!(
                        "- ID: {}, Name: {}, Duration: {} months",
                        c.id, c.name, c.duration_months
                    )
                }));
                lines
            }
            SeedOutcome::Skipped { existing } => vec![format!(
                "Database already has {} course(s). Skipping initial seeding.",
                existing
            )],
            SeedOutcome::Failed(message) => vec![format!("Error inserting courses: {}", message)],
        }
    }
}

/// Seed the default courses if the course table is empty
pub fn seed_courses(repo: &Repository) -> SeedOutcome {
    let defaults: Vec<NewCourse> = DEFAULT_COURSES
        .iter()
        .map(|(name, months)| NewCourse::new(*name, *months))
        .collect();
    seed_courses_with(repo, &defaults)
}

/// Seed `courses` if the course table is empty.
///
/// All rows go in one transaction; any failure rolls every row back and is
/// reported as [`SeedOutcome::Failed`] instead of an error.
pub fn seed_courses_with(repo: &Repository, courses: &[NewCourse]) -> SeedOutcome {
    match try_seed(repo, courses) {
        Ok(outcome) => {
            match &outcome {
                SeedOutcome::Seeded(inserted) => {
                    tracing::info!(count = inserted.len(), "Seeded initial courses")
                }
                SeedOutcome::Skipped { existing } => {
                    tracing::info!(existing, "Courses already present, skipping seed")
                }
                SeedOutcome::Failed(_) => {}
            }
            outcome
        }
        Err(e) => {
            tracing::error!("Course seeding rolled back: {}", e);
            SeedOutcome::Failed(e.to_string())
        }
    }
}

fn try_seed(repo: &Repository, courses: &[NewCourse]) -> Result<SeedOutcome> {
    repo.with_connection(|conn| {
        let existing = Repository::count_courses_with(conn)?;
        if existing > 0 {
            return Ok(SeedOutcome::Skipped { existing });
        }

        // Dropping the transaction without commit rolls it back
        let tx = conn.unchecked_transaction()?;
        let mut inserted = Vec::with_capacity(courses.len());
        for course in courses {
            inserted.push(Repository::insert_course_with(&tx, course)?);
        }
        tx.commit()?;

        Ok(SeedOutcome::Seeded(inserted))
    })
}
