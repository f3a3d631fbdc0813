use crate::lesson::{self, LessonPlanRequest};
use crate::providers::traits::SharedProvider;
use colored::Colorize;

const USAGE: &str = "Usage: plan <hours> <sessions> <unit details>";

pub async fn handle_command(
    input: &str,
    provider: &SharedProvider,
    fallback: Option<&SharedProvider>,
) -> Result<(), String> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    if parts.len() < 4 {
        println!("{}", USAGE);
        return Ok(());
    }

    let session_hours: u32 = parts[1]
        .parse()
        .map_err(|_| format!("'{}' is not a number of hours. {}", parts[1], USAGE))?;
    let num_sessions: u32 = parts[2]
        .parse()
        .map_err(|_| format!("'{}' is not a number of sessions. {}", parts[2], USAGE))?;
    let unit_details = parts[3..].join(" ");

    let request = LessonPlanRequest {
        unit_details,
        session_hours,
        num_sessions,
    };

    let plan = lesson::generate_plan(provider, fallback, &request)
        .await
        .map_err(|e| format!("Failed to generate lesson plan: {}", e))?;

    println!("\n📋 Lesson Plan:");
    println!("{}", plan.bright_green());

    // The encouragement is a nicety; losing it never fails the plan.
    match lesson::motivational_line(provider).await {
        Ok(line) => println!("\n✨ {}", line.trim().bright_cyan()),
        Err(e) => log::warn!("Failed to fetch motivational line: {:#}", e),
    }

    Ok(())
}
