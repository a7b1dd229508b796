//! Domain records scraped out of the campus portals.

use chrono::{NaiveDate, NaiveDateTime};

use crate::slot::Slot;

/// One course occupying one teaching slot on one concrete date.
///
/// Produced by timetable extraction; the positional cell index has already
/// been resolved into a `date` and a validated [`Slot`]. The free-text
/// fields carry whatever the portal rendered, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub date: NaiveDate,
    pub slot: Slot,
    /// Course name as displayed.
    pub course: String,
    pub teacher: String,
    /// Room, e.g. `6C-305`.
    pub location: String,
    /// Credit or score text, e.g. `2.0`.
    pub credit: String,
    /// Human-readable week-range text, e.g. `1-16周`.
    pub weeks: String,
    /// Human-readable periods text, e.g. `3-4节`.
    pub schedule_text: String,
}

/// One scheduled exam sitting.
///
/// `start <= end` holds for every value that leaves extraction; rows whose
/// compound time range is malformed or inverted are rejected there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamEntry {
    pub exam_id: String,
    pub course_id: String,
    pub course: String,
    pub teacher: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub classroom: String,
    pub seat: String,
}

/// One hit from the student directory search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
}
