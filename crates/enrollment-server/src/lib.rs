//! Enrollment Server
//!
//! HTTP surface for enrollment records: the legacy user form page and a
//! small JSON API over courses and students.

pub mod form;
pub mod http;
pub mod logging;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use enrollment_core::{Repository, Result, Settings};

/// Shared application state
pub struct AppState {
    pub repository: Repository,
}

impl AppState {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Connect to the configured database and make sure the schema exists
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let repository = Repository::connect(&settings.database)?;
        tracing::info!(
            profile = %settings.profile,
            url = %settings.database.url,
            "Database ready"
        );
        Ok(Self::new(repository))
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Legacy form page
        .route("/", get(form::index).post(form::submit))
        // Course endpoints
        .route("/api/cursos", get(http::list_courses))
        .route("/api/cursos/{id}", get(http::get_course))
        .route("/api/cursos/{id}/alunos", get(http::list_course_students))
        // Student endpoints
        .route("/api/alunos", get(http::list_students).post(http::create_student))
        // System endpoints
        .route("/api/estatisticas", get(http::get_statistics))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn serve(
    addr: &str,
    state: Arc<AppState>,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Enrollment server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
