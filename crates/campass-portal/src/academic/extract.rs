//! Regex extraction of academic-system pages.
//!
//! The academic system renders everything server-side; these extractors
//! pull typed records out of the markup with fixed patterns. A fragment
//! that does not match its pattern contributes nothing: no error, no
//! partially-filled record, just a debug line. The patterns are pinned to
//! the markup the portal actually serves, down to attribute order and
//! quoting, so loosening them is a behavior change, not a cleanup.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use tracing::debug;

use campass_core::record::{ExamEntry, ScheduleEntry};
use campass_core::slot::{DAYS_PER_WEEK, Slot};

/// Splits a timetable page into its 42 positional cell fragments
/// (6 slots x 7 days, row-major).
static TIMETABLE_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<td align="left">\r?\n\s*\r?\n(.*)\r?\n\r?\n\s*</td>"#)
        .expect("Invalid timetable cell regex")
});

/// Parses one non-blank cell fragment. Capture order: teacher, week-range
/// text, course name, credit, periods text, room.
static CELL_COURSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<span onmouseover='kbtc\(this\)' onmouseout='kbot\(this\)' class='box' style='[^']*'><p>[^<]*</p><p>([^<]*)</p><span class='text'>([^<]*)</span></span><div class='item-box' ><p>(\S*)</p><div class='tch-name'><span>(\S*)</span><span>([^<]*)</span></div><div><span><img src='/jsxsd/assets_v1/images/item1.png'>([^<]*)</span>"#,
    )
    .expect("Invalid course cell regex")
});

/// Parses one exam table row into its ten columns.
static EXAM_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<tr>\s*<td\s?>(.*)</td>\s*<td\s?\S*>(.*)</td>\s*<td\s?\S*>(.*)</td>\s*<td\s?\S*>(.*)</td>\s*<td\s?\S*>(.*)</td>\s*<td\s?\S*>(.*)</td>\s*<td\s?\S*>(.*)</td>\s*<td\s*\S*>(.*)</td>\s*<td\s*\S*>(.*)</td>\s*<td>(.*)</td>"#,
    )
    .expect("Invalid exam row regex")
});

static DISPLAY_MODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-value="(.*)" name="kbjcmsid""#).expect("Invalid display mode regex")
});

static SEMESTER_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<option value="">([\d-]*)</option>"#).expect("Invalid semester option regex")
});

static WEEK_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<option value="([\d-]+)"\s*\S*>(.*)</option>"#)
        .expect("Invalid week option regex")
});

static EXAM_SEMESTER_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<option\s\S*\s*value="([^"]*)">2"#).expect("Invalid exam semester regex")
});

static ELECTION_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<tr>\s*<td>([^<]*)</td>\s*<td>([^<]*)</td>\s*<td>([^<]*)</td>\s*<td>\s*.*toxk\('(.*)'\)""#,
    )
    .expect("Invalid election row regex")
});

/// Values scraped off the timetable landing page; everything the weekly
/// fetch needs as query parameters.
#[derive(Debug, Clone, Default)]
pub struct TimetableContext {
    /// Opaque display-mode value the portal threads through timetable
    /// requests.
    pub display_mode: String,
    /// Semester ids, most recent first as rendered.
    pub semesters: Vec<String>,
    /// Selectable weeks with their Monday start dates.
    pub weeks: Vec<WeekOption>,
}

/// One selectable week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekOption {
    /// Display label, e.g. `第 3 周`.
    pub label: String,
    /// First day of the week.
    pub start: NaiveDate,
}

/// One course election round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionRound {
    pub id: String,
    pub name: String,
    pub semester: String,
    /// Human-readable open window text.
    pub window: String,
}

/// Extracts schedule entries from a weekly timetable page.
///
/// Cells are positional: `day = index % 7`, `slot = index / 7`, date is
/// `week_start` plus the day offset. Blank cells keep their index but
/// yield nothing, as do cells that fail the course pattern.
pub fn timetable(page: &str, week_start: NaiveDate) -> Vec<ScheduleEntry> {
    let mut entries = Vec::new();
    for (index, cell) in TIMETABLE_CELL.captures_iter(page).enumerate() {
        let fragment = &cell[1];
        if fragment.trim().is_empty() {
            continue;
        }
        let Some(slot) = Slot::new(index / DAYS_PER_WEEK) else {
            debug!(index, "timetable cell outside the slot grid");
            continue;
        };
        let Some(course) = CELL_COURSE.captures(fragment) else {
            debug!(index, "timetable cell did not match the course pattern");
            continue;
        };
        let day = index % DAYS_PER_WEEK;
        entries.push(ScheduleEntry {
            date: week_start + Duration::days(day as i64),
            slot,
            course: course[3].trim().to_string(),
            teacher: course[1].trim().to_string(),
            location: course[6].trim().to_string(),
            credit: course[4].trim().to_string(),
            weeks: course[2].trim().to_string(),
            schedule_text: course[5].trim().to_string(),
        });
    }
    debug!(entries = entries.len(), week = %week_start, "extracted timetable");
    entries
}

/// Extracts exam entries from the exam arrangement listing.
///
/// Rows whose compound datetime column does not parse, or whose range is
/// inverted, are dropped.
pub fn exams(page: &str) -> Vec<ExamEntry> {
    let mut entries = Vec::new();
    for row in EXAM_ROW.captures_iter(page) {
        let compound = row[8].trim();
        let Some((start, end)) = parse_exam_window(compound) else {
            debug!(compound, "exam row with unusable datetime column");
            continue;
        };
        entries.push(ExamEntry {
            exam_id: row[4].trim().to_string(),
            course_id: row[5].trim().to_string(),
            course: row[6].trim().to_string(),
            teacher: row[7].trim().to_string(),
            start,
            end,
            classroom: row[9].trim().to_string(),
            seat: row[10].trim().to_string(),
        });
    }
    debug!(entries = entries.len(), "extracted exam listing");
    entries
}

/// Extracts the timetable context off the landing page.
pub fn timetable_context(page: &str) -> TimetableContext {
    let display_mode = match DISPLAY_MODE.captures(page) {
        Some(captures) => captures[1].to_string(),
        None => {
            debug!("landing page carried no display mode value");
            String::new()
        }
    };
    let semesters = SEMESTER_OPTION
        .captures_iter(page)
        .map(|captures| captures[1].to_string())
        .filter(|semester| !semester.is_empty())
        .collect();
    let weeks = WEEK_OPTION
        .captures_iter(page)
        .filter_map(|captures| {
            let label = captures[2].trim().to_string();
            match NaiveDate::parse_from_str(&captures[1], "%Y-%m-%d") {
                Ok(start) => Some(WeekOption { label, start }),
                Err(_) => {
                    debug!(value = &captures[1], "week option with unparseable date");
                    None
                }
            }
        })
        .collect();
    TimetableContext {
        display_mode,
        semesters,
        weeks,
    }
}

/// Extracts the semester ids offered by the exam query page.
pub fn exam_semesters(page: &str) -> Vec<String> {
    EXAM_SEMESTER_OPTION
        .captures_iter(page)
        .map(|captures| captures[1].to_string())
        .collect()
}

/// Extracts course election rounds from the election listing.
pub fn election_rounds(page: &str) -> Vec<ElectionRound> {
    ELECTION_ROW
        .captures_iter(page)
        .map(|captures| ElectionRound {
            id: captures[4].to_string(),
            name: captures[2].trim().to_string(),
            semester: captures[1].trim().to_string(),
            window: captures[3].trim().to_string(),
        })
        .collect()
}

/// Parses the compound `YYYY-MM-DD HH:MM~HH:MM` exam column. Exams never
/// span midnight, so both endpoints share the date.
fn parse_exam_window(compound: &str) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let mut parts = compound.split_whitespace();
    let date = NaiveDate::parse_from_str(parts.next()?, "%Y-%m-%d").ok()?;
    let range = parts.next()?;
    let (start_raw, end_raw) = range.split_once('~')?;
    let start = date.and_time(NaiveTime::parse_from_str(start_raw, "%H:%M").ok()?);
    let end = date.and_time(NaiveTime::parse_from_str(end_raw, "%H:%M").ok()?);
    if end < start {
        return None;
    }
    Some((start, end))
}
