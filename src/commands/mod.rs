use crate::analysis::Advisor;
use crate::providers::traits::SharedProvider;
use crate::rag::RagEngine;
use crate::session::ChatSession;
use crate::storage::Database;
use std::path::PathBuf;
use std::sync::Arc;

mod analyze;
mod counsel;
mod plan;
mod quiz_cmd;
mod summarize;
mod system;

pub struct CommandHandler {
    engine: Arc<RagEngine>,
    advisor: Advisor,
    provider: SharedProvider,
    fallback: Option<SharedProvider>,
    db: Arc<Database>,
    session: ChatSession,
    reports_dir: PathBuf,
}

impl CommandHandler {
    pub fn new(
        engine: Arc<RagEngine>,
        provider: SharedProvider,
        fallback: Option<SharedProvider>,
        db: Arc<Database>,
        reports_dir: PathBuf,
    ) -> Self {
        let advisor = Advisor::new(provider.clone(), fallback.clone());

        Self {
            engine,
            advisor,
            provider,
            fallback,
            db,
            session: ChatSession::new(),
            reports_dir,
        }
    }

    pub async fn handle_command(&mut self, input: &str) -> Result<(), String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }

        match input.to_lowercase().as_str() {
            "help" | "exit" | "quit" => return system::handle_command(input),
            _ => {}
        }

        if input == "analyze" || input.starts_with("analyze ") {
            return analyze::handle_command(input, &self.advisor, &self.db, &self.reports_dir)
                .await;
        }

        if input == "quiz" || input.starts_with("quiz ") {
            return quiz_cmd::handle_command(
                input,
                &self.provider,
                self.fallback.as_ref(),
                &self.reports_dir,
            )
            .await;
        }

        if input == "plan" || input.starts_with("plan ") {
            return plan::handle_command(input, &self.provider, self.fallback.as_ref()).await;
        }

        if input == "summarize" || input.starts_with("summarize ") {
            return summarize::handle_command(input, &self.engine, &self.db).await;
        }

        if input == "corpus" || input.starts_with("corpus ") {
            return counsel::handle_corpus(input, &self.engine).await;
        }

        // Anything else is a message for the counsellor.
        counsel::handle_message(input, &self.engine, &mut self.session, &self.db).await
    }
}
