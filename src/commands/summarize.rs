use crate::ingest;
use crate::rag::RagEngine;
use crate::storage::Database;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

pub async fn handle_command(
    input: &str,
    engine: &Arc<RagEngine>,
    db: &Arc<Database>,
) -> Result<(), String> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let Some(file_path) = parts.get(1) else {
        println!("Usage: summarize <pdf>");
        return Ok(());
    };

    let document = ingest::load_document(file_path).map_err(|e| e.to_string())?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message("Summarizing lesson into bullet points...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let summary = match engine.summarize_document(&document).await {
        Ok(summary) => {
            spinner.finish_with_message("Lesson summarized successfully!");
            summary
        }
        Err(e) => {
            spinner.finish_and_clear();
            return Err(format!("Error generating summary: {}", e));
        }
    };

    println!("\n📌 Lesson Summary:");
    println!("{}", summary.bright_green());

    if let Err(e) = db
        .save_insight(document.source.clone(), "summary".to_string(), summary)
        .await
    {
        eprintln!("Warning: Failed to save insight to database: {}", e);
    }

    Ok(())
}
