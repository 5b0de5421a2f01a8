//! DocJourney — documentation explainer server.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use docjourney_avatar::SimliClient;
use docjourney_chat::OpenAIClient;
use docjourney_core::DocJourneyConfig;
use docjourney_ingest::HttpFetcher;
use docjourney_server::{build_router, AppState};
use docjourney_store::ScriptStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "scripts" => {
                let config = DocJourneyConfig::from_env()?;
                let store = ScriptStore::open(&config.data_paths.database)
                    .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;
                print_scripts(&store)?;
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("DocJourney — documentation explainer server");
                println!();
                println!("Usage: docjourney [command]");
                println!();
                println!("Commands:");
                println!("  (none)     Start the server");
                println!("  scripts    List cached documentation scripts");
                println!("  help       Show this help message");
                return Ok(());
            }
            _ => {
                eprintln!(
                    "Unknown command: {}. Use 'docjourney help' for usage.",
                    args[1]
                );
                std::process::exit(1);
            }
        }
    }

    let config = DocJourneyConfig::from_env()?;
    info!("Database: {}", config.data_paths.database.display());
    info!("Static files: {}", config.data_paths.static_dir.display());

    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; script generation and chat will fail");
    }
    if config.avatar.simli_api_key.is_none() || config.avatar.elevenlabs_api_key.is_none() {
        warn!("SIMLIAI_API_KEY or ELEVENLABS_API_KEY is not set; avatar generation is disabled");
    }

    let store = ScriptStore::open(&config.data_paths.database)
        .map_err(|e| anyhow::anyhow!("Failed to open store: {}", e))?;

    let fetcher = HttpFetcher::new(config.http_timeout)?;
    let llm = OpenAIClient::new(config.openai_api_key.clone(), config.http_timeout)?
        .with_base_url(config.openai_base_url.clone());
    let avatar_api = SimliClient::new(config.avatar.api_url.clone(), config.http_timeout)?;

    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(
        config,
        store,
        Arc::new(fetcher),
        Arc::new(llm),
        Arc::new(avatar_api),
    ));

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("DocJourney server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn print_scripts(store: &ScriptStore) -> anyhow::Result<()> {
    let scripts = store.list()?;
    if scripts.is_empty() {
        println!("No cached scripts in {}", store.db_path().display());
        return Ok(());
    }

    println!("{:<20} {:<26} ORIGINAL URL", "ROOT URL", "CREATED");
    for script in scripts {
        println!(
            "{:<20} {:<26} {}",
            script.root_url,
            script.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            script.original_url
        );
    }
    Ok(())
}
