use crate::providers::traits::SharedProvider;
use crate::quiz::{self, Difficulty};
use colored::Colorize;
use std::path::Path;
use std::str::FromStr;

const USAGE: &str = "Usage: quiz <beginner|intermediate|expert> <count> <topic>";

pub async fn handle_command(
    input: &str,
    provider: &SharedProvider,
    fallback: Option<&SharedProvider>,
    reports_dir: &Path,
) -> Result<(), String> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    if parts.len() < 4 {
        println!("{}", USAGE);
        return Ok(());
    }

    let difficulty = Difficulty::from_str(parts[1]).map_err(|e| e.to_string())?;
    let count: u32 = parts[2]
        .parse()
        .map_err(|_| format!("'{}' is not a question count. {}", parts[2], USAGE))?;
    if count == 0 || count > 20 {
        return Err("Question count must be between 1 and 20".to_string());
    }
    let topic = parts[3..].join(" ");

    println!("📝 Generating a {} question quiz on {}...", count, topic.bright_yellow());

    let quiz = quiz::generate(provider, fallback, &topic, difficulty, count)
        .await
        .map_err(|e| format!("Failed to generate quiz: {}", e))?;

    println!("\n{}", quiz.render_with_answers().bright_green());

    let docx = quiz
        .worksheet_docx("", &format!("{} quiz", topic))
        .map_err(|e| format!("Failed to build worksheet: {}", e))?;

    std::fs::create_dir_all(reports_dir)
        .map_err(|e| format!("Failed to create {}: {}", reports_dir.display(), e))?;
    let path = reports_dir.join(format!("{}_quiz.docx", sanitize(&topic)));
    std::fs::write(&path, docx).map_err(|e| format!("Failed to write worksheet: {}", e))?;

    println!("📥 Worksheet saved to {}", path.display().to_string().cyan());
    Ok(())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
