//! Student directory search command.

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::render;

/// Searches the directory and prints `id  name` lines.
pub async fn run(query: &str, config: &ClientConfig) -> ClientResult<()> {
    let session = super::established_session(config).await?;
    let academic = super::bridged_academic(config, &session).await?;

    let students = academic.search_students(&session, query).await?;
    if students.is_empty() {
        println!("No students matched '{}'.", query);
        return Ok(());
    }
    for line in render::student_lines(&students) {
        println!("{}", line);
    }
    Ok(())
}
