//! Calendar projection of schedule and exam records.
//!
//! The portal publishes wall-clock times with no timezone attached, so
//! events are emitted with floating datetimes and left for the importing
//! calendar to localize. Projection is pure: it reads records and a
//! caller-supplied timestamp, never the clock.

use chrono::NaiveDateTime;
use icalendar::{Calendar, Component, Event, EventLike};

use crate::record::{ExamEntry, ScheduleEntry};

/// Projects one timetable entry into a calendar event.
///
/// Start and end come from the entry's date combined with its slot bounds,
/// so a slot-3 course on 2024-03-11 spans 14:30 to 16:05 that day.
pub fn schedule_event(entry: &ScheduleEntry) -> Event {
    let description = format!(
        "{}\n{}\n{}\n{}",
        entry.teacher, entry.credit, entry.weeks, entry.schedule_text
    );
    Event::new()
        .uid(&format!(
            "{}-{}@campass",
            entry.date.format("%Y%m%d"),
            entry.slot.index()
        ))
        .summary(&entry.course)
        .description(&description)
        .location(&entry.location)
        .starts(entry.date.and_time(entry.slot.start()))
        .ends(entry.date.and_time(entry.slot.end()))
        .done()
}

/// Projects one exam sitting into a calendar event.
pub fn exam_event(entry: &ExamEntry) -> Event {
    let description = format!(
        "{}({})\n{} - {}\n{}\n{}",
        entry.course, entry.course_id, entry.classroom, entry.seat, entry.teacher, entry.exam_id
    );
    Event::new()
        .uid(&format!("exam-{}@campass", entry.exam_id))
        .summary(&format!("Exam: {}", entry.course))
        .description(&description)
        .location(&format!("{} - {}", entry.classroom, entry.seat))
        .starts(entry.start)
        .ends(entry.end)
        .done()
}

/// Collects projected events into a calendar.
pub fn build_calendar(events: impl IntoIterator<Item = Event>) -> Calendar {
    let mut calendar = Calendar::new();
    for event in events {
        calendar.push(event);
    }
    calendar
}

/// File name for an exported calendar, derived from the export timestamp.
pub fn export_filename(now: NaiveDateTime) -> String {
    format!("{}.ics", now.format("%Y%m%d%H%M%S"))
}
