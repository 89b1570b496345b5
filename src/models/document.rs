//! The persisted timetable document.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Semester;

/// Name of the semester created on first start, and the selection fallback
/// once every semester has been deleted.
pub const DEFAULT_SEMESTER: &str = "Semester 1 2024";

const SEMESTERS: &str = "semesters";
const CURRENT_SEMESTER: &str = "currentSemester";
const LAST_UPDATED: &str = "lastUpdated";

/// The root document holding all timetable data.
///
/// Stored as the raw JSON object so that whatever the front-end saves is
/// written back untouched. Key order follows insertion order. Only the
/// semester operations look inside, through the accessors below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

/// The document has no `semesters` object, so semester operations cannot run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedDocument;

impl std::fmt::Display for MalformedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "document has no `{}` object", SEMESTERS)
    }
}

impl std::error::Error for MalformedDocument {}

/// Request body for `POST /api/data`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceDocumentRequest {
    #[serde(default)]
    pub data: Option<Value>,
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl Document {
    /// The document written on first start.
    pub fn seed() -> Self {
        let mut semesters = Map::new();
        semesters.insert(DEFAULT_SEMESTER.to_string(), semester_value());

        let mut map = Map::new();
        map.insert(SEMESTERS.to_string(), Value::Object(semesters));
        map.insert(
            CURRENT_SEMESTER.to_string(),
            Value::String(DEFAULT_SEMESTER.to_string()),
        );
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn semesters(&self) -> Result<&Map<String, Value>, MalformedDocument> {
        self.0
            .get(SEMESTERS)
            .and_then(Value::as_object)
            .ok_or(MalformedDocument)
    }

    fn semesters_mut(&mut self) -> Result<&mut Map<String, Value>, MalformedDocument> {
        self.0
            .get_mut(SEMESTERS)
            .and_then(Value::as_object_mut)
            .ok_or(MalformedDocument)
    }

    /// The selected semester, if it is a string.
    pub fn current_semester(&self) -> Option<&str> {
        self.0.get(CURRENT_SEMESTER).and_then(Value::as_str)
    }

    /// `lastUpdated`, or `None` if it is missing or unparseable.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.0
            .get(LAST_UPDATED)
            .and_then(Value::as_str)
            .and_then(timestamp::parse)
    }

    pub fn semester(&self, name: &str) -> Result<Option<&Value>, MalformedDocument> {
        Ok(self.semesters()?.get(name))
    }

    /// Add an empty semester. Returns `Ok(None)` if the name is taken.
    pub fn add_semester(&mut self, name: &str) -> Result<Option<&Value>, MalformedDocument> {
        let semesters = self.semesters_mut()?;
        if semesters.contains_key(name) {
            return Ok(None);
        }
        semesters.insert(name.to_string(), semester_value());
        Ok(semesters.get(name))
    }

    /// Remove a semester, moving the selection if it pointed at the removed
    /// one. Returns `Ok(false)` if there was no such semester.
    ///
    /// When nothing is left the selection falls back to [`DEFAULT_SEMESTER`]
    /// even though no semester of that name exists.
    pub fn remove_semester(&mut self, name: &str) -> Result<bool, MalformedDocument> {
        let semesters = self.semesters_mut()?;
        if semesters.shift_remove(name).is_none() {
            return Ok(false);
        }
        let next = semesters
            .keys()
            .next()
            .cloned()
            .unwrap_or_else(|| DEFAULT_SEMESTER.to_string());

        if self.current_semester() == Some(name) {
            self.0
                .insert(CURRENT_SEMESTER.to_string(), Value::String(next));
        }

        Ok(true)
    }

    /// Set `lastUpdated`, truncated to the millisecond precision that is
    /// persisted. Two writes within the same millisecond get equal stamps.
    pub fn stamp(&mut self, now: DateTime<Utc>) {
        let now = now.trunc_subsecs(3);
        self.0.insert(
            LAST_UPDATED.to_string(),
            Value::String(timestamp::format(&now)),
        );
    }
}

fn semester_value() -> Value {
    serde_json::to_value(Semester::default()).unwrap_or_default()
}

/// RFC 3339 timestamps with millisecond precision, e.g. `2024-05-01T10:00:00.000Z`.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }
}
