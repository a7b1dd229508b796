//! Plain-text rendering of portal records.

use campass_core::record::{ExamEntry, ScheduleEntry, StudentRecord};

/// Formats schedule entries, one line per class, grouped by date.
///
/// Entries are sorted by date and slot; each new date starts a group with
/// its own heading and a blank separator line between groups.
pub fn schedule_lines(entries: &[ScheduleEntry]) -> Vec<String> {
    let mut sorted: Vec<&ScheduleEntry> = entries.iter().collect();
    sorted.sort_by_key(|entry| (entry.date, entry.slot.index()));

    let mut lines = Vec::new();
    let mut current_date = None;
    for entry in sorted {
        if current_date != Some(entry.date) {
            if current_date.is_some() {
                lines.push(String::new());
            }
            lines.push(entry.date.format("%Y-%m-%d %a").to_string());
            current_date = Some(entry.date);
        }
        lines.push(format!(
            "  {}-{}  {}  {}  {}",
            entry.slot.start().format("%H:%M"),
            entry.slot.end().format("%H:%M"),
            entry.course,
            entry.location,
            entry.teacher
        ));
    }
    lines
}

/// Formats exam entries, one line per exam.
pub fn exam_lines(exams: &[ExamEntry]) -> Vec<String> {
    exams
        .iter()
        .map(|exam| {
            format!(
                "{} ~ {}  {}  {}  seat {}",
                exam.start.format("%Y-%m-%d %H:%M"),
                exam.end.format("%H:%M"),
                exam.course,
                exam.classroom,
                exam.seat
            )
        })
        .collect()
}

/// Formats student search hits, one `id  name` line each.
pub fn student_lines(students: &[StudentRecord]) -> Vec<String> {
    students
        .iter()
        .map(|student| format!("{}  {}", student.id, student.name))
        .collect()
}
