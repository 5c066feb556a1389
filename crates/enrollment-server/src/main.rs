//! Enrollment Server Binary
//!
//! Resolves settings from the environment and the optional settings file,
//! initializes the schema, and serves the form page and JSON API.

use std::sync::Arc;

use enrollment_core::Settings;
use enrollment_server::{logging, serve, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::resolve()?;
    logging::init(&settings);

    let state = Arc::new(AppState::from_settings(&settings)?);
    let addr = std::env::var("ENROLLMENT_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string());

    serve(&addr, state).await
}
