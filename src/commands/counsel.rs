use crate::ingest;
use crate::rag::RagEngine;
use crate::session::ChatSession;
use crate::storage::Database;
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// Per-character delay for the typed-out reply. Purely cosmetic; the full
/// response is already available before printing starts.
const TYPING_DELAY: Duration = Duration::from_millis(12);

pub async fn handle_message(
    message: &str,
    engine: &Arc<RagEngine>,
    session: &mut ChatSession,
    db: &Arc<Database>,
) -> Result<(), String> {
    let response = engine
        .counsel(session, message)
        .await
        .map_err(|e| format!("Counsellor error: {}", e))?;

    print!("\n💡 ");
    type_out(&response).await;
    println!();

    for (role, text) in [("user", message), ("assistant", response.as_str())] {
        if let Err(e) = db
            .save_transcript(session.id.clone(), role.to_string(), text.to_string())
            .await
        {
            eprintln!("Warning: Failed to save transcript: {}", e);
        }
    }

    Ok(())
}

pub async fn handle_corpus(input: &str, engine: &Arc<RagEngine>) -> Result<(), String> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let Some(file_path) = parts.get(1) else {
        println!("Usage: corpus <pdf>");
        return Ok(());
    };

    let document = ingest::load_document(file_path).map_err(|e| e.to_string())?;
    let stored = engine
        .add_wellness_corpus(&document)
        .await
        .map_err(|e| format!("Failed to ingest corpus document: {}", e))?;

    println!(
        "📚 Added {} chunks from {} to the counselling knowledge base",
        stored,
        document.source.cyan()
    );
    Ok(())
}

async fn type_out(text: &str) {
    let mut stdout = std::io::stdout();
    for c in text.chars() {
        print!("{}", c.to_string().truecolor(255, 236, 179));
        stdout.flush().ok();
        tokio::time::sleep(TYPING_DELAY).await;
    }
}
