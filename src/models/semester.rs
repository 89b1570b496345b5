//! Semester record and semester request bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// College assigned to newly created semesters.
pub const DEFAULT_COLLEGE: &str = "Moss Vale";

/// A semester's timetable data. Nested records are opaque to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Semester {
    #[serde(default)]
    pub courses: Vec<Value>,
    #[serde(default)]
    pub teachers: Vec<Value>,
    #[serde(default)]
    pub subjects: Vec<Value>,
    #[serde(default)]
    pub schedule: Vec<Value>,
    #[serde(default = "default_college")]
    pub current_college: String,
}

fn default_college() -> String {
    DEFAULT_COLLEGE.to_string()
}

impl Default for Semester {
    fn default() -> Self {
        Self {
            courses: Vec::new(),
            teachers: Vec::new(),
            subjects: Vec::new(),
            schedule: Vec::new(),
            current_college: default_college(),
        }
    }
}

/// Request body for creating a new semester.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSemesterRequest {
    #[serde(default)]
    pub name: Option<Value>,
}

impl CreateSemesterRequest {
    /// The requested name as a key. Blank strings, `0`, `false` and `null`
    /// count as missing; numbers and `true` use their JSON text.
    pub fn name(&self) -> Option<String> {
        match self.name.as_ref()? {
            Value::String(name) if !name.trim().is_empty() => Some(name.clone()),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            Value::Bool(true) => Some("true".to_string()),
            _ => None,
        }
    }
}
