//! Legacy user form page

use std::fmt::Write;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;

use enrollment_core::{LegacyUser, NewLegacyUser};

use crate::AppState;

/// Submitted form fields
#[derive(Debug, Deserialize)]
pub struct UserForm {
    #[serde(alias = "nome")]
    pub name: String,
    pub email: String,
}

/// Render the page with every stored legacy user
pub async fn index(
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, (StatusCode, String)> {
    let users = state
        .repository
        .list_legacy_users()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Html(render_page(&users)))
}

/// Store a legacy user and redirect back to the page
///
/// Storage errors are not translated into a friendly message.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<UserForm>,
) -> Result<Redirect, (StatusCode, String)> {
    let user = state
        .repository
        .insert_legacy_user(&NewLegacyUser::new(form.name, form.email))
        .map_err(|e| {
            tracing::error!("Failed to store legacy user: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    tracing::debug!(id = user.id, "Stored legacy user");
    Ok(Redirect::to("/"))
}

fn render_page(users: &[LegacyUser]) -> String {
    let mut rows = String::new();
    for user in users {
        let _ = writeln!(
            rows,
            "      <tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            user.id,
            escape_html(&user.name),
            escape_html(&user.email)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Registrations</title>
</head>
<body>
  <h1>Registration</h1>
  <form method="post" action="/">
    <label>Name <input type="text" name="name" required></label>
    <label>Email <input type="email" name="email" required></label>
    <button type="submit">Save</button>
  </form>
  <h2>Saved users</h2>
  <table>
    <thead><tr><th>ID</th><th>Name</th><th>Email</th></tr></thead>
    <tbody>
{}    </tbody>
  </table>
</body>
</html>
"#,
        rows
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
