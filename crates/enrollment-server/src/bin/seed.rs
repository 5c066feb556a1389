//! Seed entry point
//!
//! Creates the schema if needed and inserts the default courses into an
//! empty database. Seeding failures are reported, not propagated: the
//! process still exits successfully.

use enrollment_core::{seed_courses, Repository, Settings};
use enrollment_server::logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::resolve()?;
    logging::init(&settings);

    let repo = Repository::connect(&settings.database)?;
    let outcome = seed_courses(&repo);

    for line in outcome.report() {
        println!("{}", line);
    }

    Ok(())
}
