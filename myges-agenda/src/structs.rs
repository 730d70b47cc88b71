use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer};

/// One entry of the `--raw` agenda payload, as the portal sends it.
///
/// Only `name` and both timestamps are required; everything else may be
/// missing or `null`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRecord {
    pub name: String,
    /// Epoch milliseconds, sometimes sent as a float.
    pub start_date: f64,
    /// Epoch milliseconds, sometimes sent as a float.
    pub end_date: f64,
    #[serde(default)]
    pub rooms: Option<Vec<Room>>,
    #[serde(default)]
    pub classes: Option<Vec<String>>,
    #[serde(default)]
    pub discipline: Option<Discipline>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Room {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub campus: Option<String>,
    #[serde(default, deserialize_with = "deserialize_floor")]
    pub floor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Discipline {
    #[serde(default)]
    pub student_group_name: Option<String>,
    #[serde(default)]
    pub teacher: Option<String>,
}

// Floors come through either as "3" or as 3.
fn deserialize_floor<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(floor)) => Some(floor),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Confirmed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Confirmed => "CONFIRMED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Course,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Course => "COURSE",
        }
    }
}

/// A schedule entry ready to be written as a `VEVENT`.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub location: String,
    pub description: String,
    pub category: Category,
    pub status: Status,
}

/// Every event collected during a run, in the order it was fetched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calendar {
    pub events: Vec<CalendarEvent>,
}

impl Calendar {
    pub const PRODUCT_ID: &'static str = "-//MyGES Calendar//";
    pub const VERSION: &'static str = "2.0";
    pub const SCALE: &'static str = "GREGORIAN";

    pub fn new() -> Self {
        Self::default()
    }

    /// Appends without deduplication: the same class seen in two
    /// overlapping weeks shows up twice.
    pub fn push(&mut self, event: CalendarEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
