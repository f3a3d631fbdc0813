use classpilot::api;
use classpilot::commands::CommandHandler;
use classpilot::config::{self, AppConfig, ProviderSettings};
use classpilot::providers::gemini::gemini::GeminiProvider;
use classpilot::providers::openai::openai::OpenAIProvider;
use classpilot::providers::traits::{CompletionProvider, SharedProvider};
use classpilot::rag::{RagEngine, VectorStore};
use classpilot::storage::Database;
use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

const SYSTEM_MESSAGE: &str = "You are an experienced teaching assistant helping school \
teachers with gradebook analysis, lesson planning, quizzes and wellbeing. Be concise and practical.";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Text-generation provider: gemini (default) or openai
    #[arg(long)]
    provider: Option<String>,

    #[arg(short, long)]
    api_key: Option<String>,

    /// Run the JSON API server instead of the interactive CLI
    #[arg(long)]
    api: bool,

    #[arg(long, default_value = "3000")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    colored::control::set_override(true);
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    if args.api {
        run_api_server(args).await
    } else {
        run_cli_mode(&args).await
    }
}

/// Build the primary provider plus, when a cheaper model variant is
/// configured, the provider used for the one-shot rate-limit retry.
async fn build_providers(
    provider_name: &str,
    api_key: Option<&String>,
) -> Result<(SharedProvider, Option<SharedProvider>), Box<dyn std::error::Error + Send + Sync>> {
    let settings = ProviderSettings::from_env(provider_name);

    match provider_name {
        "openai" => {
            let key = match api_key {
                Some(key) => key.clone(),
                None => config::require_api_key("openai")?,
            };
            let primary = OpenAIProvider::new(key, SYSTEM_MESSAGE.to_string()).await?;
            let fallback: Option<SharedProvider> = settings
                .fallback_model
                .map(|model| Arc::new(primary.clone().with_model(&model)) as SharedProvider);
            Ok((Arc::new(primary), fallback))
        }
        "gemini" => {
            let key = match api_key {
                Some(key) => key.clone(),
                None => config::require_api_key("gemini")?,
            };
            let primary = GeminiProvider::new(key, SYSTEM_MESSAGE.to_string()).await?;
            let fallback: Option<SharedProvider> = settings
                .fallback_model
                .map(|model| Arc::new(primary.clone_with_model(&model)) as SharedProvider);
            Ok((Arc::new(primary), fallback))
        }
        other => Err(format!(
            "Unknown provider '{}'. Available providers: gemini, openai",
            other
        )
        .into()),
    }
}

async fn run_cli_mode(args: &Args) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app_config = AppConfig::from_env();
    let provider_name = args.provider.clone().unwrap_or(app_config.provider.clone());

    let (provider, fallback) = build_providers(&provider_name, args.api_key.as_ref()).await?;

    let store = VectorStore::connect(&app_config.qdrant_url).await?;
    let engine = Arc::new(RagEngine::new(store, provider.clone(), fallback.clone()));
    let db = Arc::new(Database::new(&app_config.db_path).await?);

    let mut command_handler = CommandHandler::new(
        engine,
        provider,
        fallback,
        db,
        PathBuf::from(app_config.reports_dir),
    );

    println!(
        "{}",
        "🧑‍🏫 classpilot — your teaching companion".bold()
    );
    command_handler.handle_command("help").await.ok();

    let mut rl = Editor::<(), DefaultHistory>::new()?;

    loop {
        match rl.readline("👤 ") {
            Ok(line) => {
                let input = line.trim();
                let _ = rl.add_history_entry(input);

                if let Err(e) = command_handler.handle_command(input).await {
                    println!("{}", e.red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

async fn run_api_server(args: Args) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;

    let app_config = AppConfig::from_env();
    let provider_name = args.provider.clone().unwrap_or(app_config.provider.clone());

    let (provider, fallback) = build_providers(&provider_name, args.api_key.as_ref()).await?;

    let store = VectorStore::connect(&app_config.qdrant_url).await?;
    let engine = Arc::new(RagEngine::new(store, provider.clone(), fallback.clone()));
    let db = Arc::new(Database::new(&app_config.db_path).await?);

    let app = api::create_api(engine, provider, fallback, db);

    println!("Starting API server on {}", addr);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    println!("Ready to accept connections!");
    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    Ok(())
}
