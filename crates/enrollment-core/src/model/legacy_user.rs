//! Legacy user records backing the standalone form page

use serde::{Deserialize, Serialize};

/// Minimal name/email record, append-only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyUser {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
}

/// Fields required to insert a legacy user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLegacyUser {
    pub name: String,
    pub email: String,
}

impl NewLegacyUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}
