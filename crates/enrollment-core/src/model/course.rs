//! Course entity

use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage-assigned course identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub i64);

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named program of study with a fixed duration in months
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub duration_months: u32,
}

/// Fields required to insert a course
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub name: String,
    pub duration_months: u32,
}

impl NewCourse {
    pub fn new(name: impl Into<String>, duration_months: u32) -> Self {
        Self {
            name: name.into(),
            duration_months,
        }
    }
}

/// Plain mapping of a course as exposed to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDict {
    pub id: i64,
    #[serde(rename = "nome_curso")]
    pub name: String,
    #[serde(rename = "duracao")]
    pub duration_months: u32,
}

impl Course {
    pub fn to_dict(&self) -> CourseDict {
        CourseDict {
            id: self.id.0,
            name: self.name.clone(),
            duration_months: self.duration_months,
        }
    }
}
