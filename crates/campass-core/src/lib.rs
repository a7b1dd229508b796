//! Core types: teaching slots, schedule and exam records, calendar projection

pub mod calendar;
pub mod record;
pub mod slot;

pub use calendar::{build_calendar, exam_event, export_filename, schedule_event};
pub use record::{ExamEntry, ScheduleEntry, StudentRecord};
pub use slot::{DAYS_PER_WEEK, SLOTS_PER_DAY, Slot};
