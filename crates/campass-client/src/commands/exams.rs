//! Exam arrangement command.

use campass_core::calendar::{build_calendar, exam_event, export_filename};
use chrono::Local;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::render;

/// Shows or exports the exam arrangement for a semester.
pub async fn run(
    semester: Option<String>,
    export: bool,
    config: &ClientConfig,
) -> ClientResult<()> {
    let session = super::established_session(config).await?;
    let academic = super::bridged_academic(config, &session).await?;

    let semester = match semester {
        Some(semester) => semester,
        None => academic
            .exam_semesters(&session)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ClientError::NotFound("the portal listed no exam semesters".to_string())
            })?,
    };

    let exams = academic.exams(&session, &semester).await?;
    if exams.is_empty() {
        println!("No exams scheduled for {}.", semester);
        return Ok(());
    }

    if export {
        let calendar = build_calendar(exams.iter().map(exam_event));
        let filename = export_filename(Local::now().naive_local());
        std::fs::write(&filename, calendar.to_string())?;
        println!("Wrote {} exams to {}.", exams.len(), filename);
        return Ok(());
    }

    println!("Exams in {}:", semester);
    for line in render::exam_lines(&exams) {
        println!("{}", line);
    }
    Ok(())
}
