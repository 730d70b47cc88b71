use std::collections::HashMap;

use chrono::{DateTime, TimeZone};
use chrono_tz::{Europe::Paris, Tz};
use once_cell::sync::Lazy;
use serde_json::Value;
use uuid::Uuid;

use crate::structs::{CalendarEvent, Category, RawRecord, Room, Status};

pub const UNKNOWN: &str = "Unknown";
pub const ADDRESS_UNKNOWN: &str = "address unknown";
pub const NOT_SPECIFIED: &str = "Not specified";

static CAMPUS_ADDRESSES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("NATION1", "242 rue du Faubourg Saint Antoine, 75012 Paris"),
        ("NATION2", "220 rue du Faubourg Saint Antoine, 75012 Paris"),
        ("VOLTAIRE1", "1 rue Bouvier, 75011 Paris"),
        ("VOLTAIRE2", "20 rue Bouvier, 75011 Paris"),
        ("ERARD", "19-21 rue Erard, 75011 Paris"),
        ("BEAUGRENELLE", "35 quai André Citroen 75015 Paris"),
        ("MONTSOURIS", "5 rue Lemaignan, 75014 Paris"),
        ("MONTROUGE", "11 rue Camille Pelletan, 92120 Montrouge"),
        ("JOURDAN", "6-10 bd Jourdan 75014 Paris"),
        ("VAUGIRARD", "273-277 rue de Vaugirard, 75012 Paris"),
        ("MAIN-D-OR", "8-14 Passage de la Main d'Or 75011 Paris"),
    ])
});

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("malformed record: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("timestamp {0} is out of range")]
    Timestamp(f64),
    #[error("`{title}` ends before it starts")]
    EndsBeforeStart { title: String },
}

/// Street address of a campus code, or [`ADDRESS_UNKNOWN`].
pub fn campus_address(campus: &str) -> &'static str {
    CAMPUS_ADDRESSES
        .get(campus)
        .copied()
        .unwrap_or(ADDRESS_UNKNOWN)
}

/// Flattens text to a single line: newlines become spaces, carriage returns
/// and backslashes are dropped, whitespace runs collapse to one space.
pub fn clean_text(text: &str) -> String {
    text.replace('\n', " ")
        .replace(['\r', '\\'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turns one entry of a week's payload into an event.
pub fn transform(value: Value) -> Result<CalendarEvent, TransformError> {
    let record = serde_json::from_value::<RawRecord>(value)?;
    CalendarEvent::try_from(record)
}

fn paris_time(millis: f64) -> Result<DateTime<Tz>, TransformError> {
    // `as` saturates, so anything past i64 lands outside chrono's range below.
    Some(millis)
        .filter(|millis| millis.is_finite())
        .and_then(|millis| Paris.timestamp_millis_opt(millis.trunc() as i64).single())
        .ok_or(TransformError::Timestamp(millis))
}

impl TryFrom<RawRecord> for CalendarEvent {
    type Error = TransformError;

    fn try_from(record: RawRecord) -> Result<Self, Self::Error> {
        let start = paris_time(record.start_date)?;
        let end = paris_time(record.end_date)?;

        if end < start {
            return Err(TransformError::EndsBeforeStart { title: record.name });
        }

        let room = record
            .rooms
            .and_then(|rooms| rooms.into_iter().next())
            .unwrap_or_else(|| Room {
                name: Some(UNKNOWN.into()),
                campus: Some(UNKNOWN.into()),
                floor: None,
            });

        let room_name = room.name.as_deref().unwrap_or(UNKNOWN);
        let campus = room.campus.as_deref().unwrap_or(UNKNOWN);
        let floor = room.floor.as_deref().unwrap_or_default();

        let location = clean_text(&format!(
            "{room_name} ({floor}) - {}",
            campus_address(campus)
        ));

        let discipline = record.discipline.unwrap_or_default();
        let group = discipline.student_group_name.unwrap_or_default();
        let teacher = discipline
            .teacher
            .filter(|teacher| !teacher.trim().is_empty())
            .unwrap_or_else(|| NOT_SPECIFIED.into());
        let classes = record.classes.unwrap_or_default().join(", ");

        let description = clean_text(&format!(
            "Group: {group} | Room: {room_name} | Classes: {classes} | Campus: {campus} | Course: {} | Teacher: {teacher}",
            record.name
        ));

        Ok(CalendarEvent {
            id: Uuid::new_v4().to_string(),
            title: record.name,
            start,
            end,
            location,
            description,
            category: Category::Course,
            status: Status::Confirmed,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Timelike};
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    // 2024-01-08 09:00 and 12:00 in Paris (UTC+1).
    const MONDAY_9AM: i64 = 1_704_700_800_000;
    const MONDAY_NOON: i64 = 1_704_711_600_000;

    fn full_record() -> Value {
        json!({
            "name": "Programmation Rust",
            "start_date": MONDAY_9AM,
            "end_date": MONDAY_NOON,
            "rooms": [
                {"name": "Salle 101", "campus": "ERARD", "floor": "1er étage"},
                {"name": "Salle 202", "campus": "NATION2", "floor": "2"}
            ],
            "classes": ["3A-AL", "3A-IABD"],
            "discipline": {"student_group_name": "3ESGI", "teacher": "Jane Doe"}
        })
    }

    #[test]
    fn converts_timestamps_to_paris_time() {
        let event = transform(full_record()).unwrap();
        assert_eq!(event.start.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(event.start.hour(), 9);
        assert_eq!(event.end.hour(), 12);
        assert_eq!(event.start.timezone(), Paris);
    }

    #[test]
    fn summer_time_is_applied() {
        // 2024-07-01 08:00 UTC
        let event = transform(json!({
            "name": "Stage",
            "start_date": 1_719_820_800_000_i64,
            "end_date": 1_719_820_800_000_i64
        }))
        .unwrap();
        assert_eq!(event.start.hour(), 10);
    }

    #[test]
    fn float_timestamps_are_accepted() {
        let event = transform(json!({
            "name": "Algèbre",
            "start_date": 1_704_700_800_000.0_f64,
            "end_date": 1_704_711_600_000.0_f64
        }))
        .unwrap();
        assert_eq!(event.start.hour(), 9);
        assert_eq!(event.end.hour(), 12);
    }

    #[test]
    fn timestamps_beyond_the_calendar_are_rejected() {
        let err = transform(json!({
            "name": "Lointain",
            "start_date": 1e300,
            "end_date": 1e300
        }))
        .unwrap_err();
        assert!(matches!(err, TransformError::Timestamp(_)));
    }

    #[test]
    fn uses_first_room_only() {
        let event = transform(full_record()).unwrap();
        assert_eq!(
            event.location,
            "Salle 101 (1er étage) - 19-21 rue Erard, 75011 Paris"
        );
    }

    #[test]
    fn builds_description_from_all_fields() {
        let event = transform(full_record()).unwrap();
        assert_eq!(event.title, "Programmation Rust");
        assert_eq!(
            event.description,
            "Group: 3ESGI | Room: Salle 101 | Classes: 3A-AL, 3A-IABD | Campus: ERARD \
             | Course: Programmation Rust | Teacher: Jane Doe"
        );
        assert_eq!(event.category, Category::Course);
        assert_eq!(event.status, Status::Confirmed);
    }

    #[test]
    fn bare_record_gets_placeholders() {
        let event = transform(json!({
            "name": "Anglais",
            "start_date": MONDAY_9AM,
            "end_date": MONDAY_NOON
        }))
        .unwrap();

        assert_eq!(event.location, "Unknown () - address unknown");
        assert_eq!(
            event.description,
            "Group: | Room: Unknown | Classes: | Campus: Unknown | Course: Anglais | Teacher: Not specified"
        );
    }

    #[test]
    fn empty_room_list_is_treated_as_missing() {
        let event = transform(json!({
            "name": "Anglais",
            "start_date": MONDAY_9AM,
            "end_date": MONDAY_NOON,
            "rooms": []
        }))
        .unwrap();

        assert!(event.location.contains(UNKNOWN));
        assert!(event.location.contains(ADDRESS_UNKNOWN));
    }

    #[test]
    fn numeric_floor_is_kept() {
        let event = transform(json!({
            "name": "Réseau",
            "start_date": MONDAY_9AM,
            "end_date": MONDAY_NOON,
            "rooms": [{"name": "B12", "campus": "JOURDAN", "floor": 3}]
        }))
        .unwrap();

        assert_eq!(event.location, "B12 (3) - 6-10 bd Jourdan 75014 Paris");
    }

    #[rstest]
    #[case(json!({"name": "x", "end_date": MONDAY_NOON}))]
    #[case(json!({"name": "x", "start_date": MONDAY_9AM}))]
    #[case(json!({"name": "x", "start_date": "09:00", "end_date": MONDAY_NOON}))]
    #[case(json!({"start_date": MONDAY_9AM, "end_date": MONDAY_NOON}))]
    #[case(json!("not an object"))]
    fn malformed_records_are_rejected(#[case] value: Value) {
        assert!(matches!(transform(value), Err(TransformError::Shape(_))));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = transform(json!({
            "name": "Inversé",
            "start_date": MONDAY_NOON,
            "end_date": MONDAY_9AM
        }))
        .unwrap_err();

        assert!(matches!(err, TransformError::EndsBeforeStart { .. }));
    }

    #[test]
    fn ids_are_unique_per_event() {
        let first = transform(full_record()).unwrap();
        let second = transform(full_record()).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[rstest]
    #[case("NATION1", "242 rue du Faubourg Saint Antoine, 75012 Paris")]
    #[case("MAIN-D-OR", "8-14 Passage de la Main d'Or 75011 Paris")]
    #[case("MONTROUGE", "11 rue Camille Pelletan, 92120 Montrouge")]
    #[case("Unknown", ADDRESS_UNKNOWN)]
    #[case("nation1", ADDRESS_UNKNOWN)]
    #[case("", ADDRESS_UNKNOWN)]
    fn campus_lookup(#[case] campus: &str, #[case] expected: &str) {
        assert_eq!(campus_address(campus), expected);
    }

    #[rstest]
    #[case("a\nb", "a b")]
    #[case("a\r\nb", "a b")]
    #[case("C:\\salle\\12", "C:salle12")]
    #[case("  lots   of\t\tspace  ", "lots of space")]
    #[case("", "")]
    fn cleans_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(clean_text(input), expected);
    }

    #[test]
    fn multiline_teacher_is_flattened() {
        let mut record = full_record();
        record["discipline"]["teacher"] = json!("Jane\nDoe\\");
        let event = transform(record).unwrap();
        assert!(event.description.ends_with("Teacher: Jane Doe"));
    }
}
