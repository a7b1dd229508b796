//! Weekly schedule command.

use campass_core::calendar::{build_calendar, export_filename, schedule_event};
use campass_portal::academic::{TimetableContext, WeekOption};
use chrono::Local;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::render;

/// Shows or exports the class schedule.
pub async fn run(
    week: Option<usize>,
    all: bool,
    export: bool,
    config: &ClientConfig,
) -> ClientResult<()> {
    let session = super::established_session(config).await?;
    let academic = super::bridged_academic(config, &session).await?;
    let context = academic.timetable_context(&session).await?;

    let mut entries = Vec::new();
    if all {
        for week in &context.weeks {
            entries.extend(academic.week_schedule(&session, &context, week).await?);
        }
    } else {
        let week = pick_week(&context, week)?;
        entries = academic.week_schedule(&session, &context, week).await?;
    }

    if entries.is_empty() {
        println!("No classes found.");
        return Ok(());
    }

    if export {
        let calendar = build_calendar(entries.iter().map(schedule_event));
        let filename = export_filename(Local::now().naive_local());
        std::fs::write(&filename, calendar.to_string())?;
        println!("Wrote {} events to {}.", entries.len(), filename);
        return Ok(());
    }

    for line in render::schedule_lines(&entries) {
        println!("{}", line);
    }
    Ok(())
}

/// Picks the requested week, or the week containing today, or the first.
fn pick_week(context: &TimetableContext, requested: Option<usize>) -> ClientResult<&WeekOption> {
    let first = context.weeks.first().ok_or_else(|| {
        ClientError::NotFound("the portal listed no teaching weeks".to_string())
    })?;

    if let Some(number) = requested {
        return context
            .weeks
            .get(number.saturating_sub(1))
            .ok_or_else(|| {
                ClientError::NotFound(format!(
                    "week {} is not on offer (the portal lists {})",
                    number,
                    context.weeks.len()
                ))
            });
    }

    let today = Local::now().date_naive();
    let current = context
        .weeks
        .iter()
        .find(|week| (0..7).contains(&(today - week.start).num_days()));
    Ok(current.unwrap_or(first))
}
