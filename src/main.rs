use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_gateway::config::{self, Config};
use todo_gateway::store::memory::MemoryStore;
use todo_gateway::store::postgres::PgStore;
use todo_gateway::store::Store;
use todo_gateway::{api, AppState};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "todo_gateway=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // `.env` first so clap `env` fallbacks see it; config is read only after
    // the command line parsed, so `--help` never depends on it.
    dotenvy::dotenv().ok();
    let args = cli::Cli::parse();
    let cfg = config::load()?;

    let result = match args.command {
        Some(cli::Commands::Serve { port, in_memory }) => run_server(cfg, port, in_memory).await,
        Some(cli::Commands::User { command }) => {
            let state = connect_state(cfg).await?;
            handle_user_command(command, &state).await
        }
        Some(cli::Commands::Token { command }) => {
            let state = connect_state(cfg).await?;
            handle_token_command(command, &state).await
        }
        Some(cli::Commands::Tag { command }) => {
            let state = connect_state(cfg).await?;
            handle_tag_command(command, &state).await
        }
        None => run_server(cfg, None, false).await,
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

/// Postgres-backed state with migrations applied, for the admin commands.
async fn connect_state(cfg: Config) -> anyhow::Result<AppState> {
    let db = PgStore::connect(&cfg.database_url).await?;
    db.migrate().await?;
    Ok(AppState::new(Arc::new(db), cfg))
}

async fn run_server(cfg: Config, port: Option<u16>, in_memory: bool) -> anyhow::Result<()> {
    cfg.check_bootstrap()?;
    let port = port.unwrap_or(cfg.port);

    let store: Arc<dyn Store> = if in_memory {
        tracing::warn!("Using the in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        tracing::info!("Connecting to database...");
        let db = PgStore::connect(&cfg.database_url).await?;
        tracing::info!("Running migrations...");
        db.migrate().await?;
        Arc::new(db)
    };

    let state = Arc::new(AppState::new(store, cfg));
    state.bootstrap().await.context("bootstrap failed")?;

    let app = api::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("todo gateway listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_user_command(cmd: cli::UserCommands, state: &AppState) -> anyhow::Result<()> {
    match cmd {
        cli::UserCommands::Add { name, password } => {
            let user = state.credentials.provision(&name, &password).await?;
            println!("User created:\n  Name: {}\n  ID:   {}", user.name, user.id);
        }
    }
    Ok(())
}

async fn handle_token_command(cmd: cli::TokenCommands, state: &AppState) -> anyhow::Result<()> {
    match cmd {
        cli::TokenCommands::Mint {
            username,
            password,
            token_type,
        } => {
            let user = state
                .credentials
                .verify(&username, &password)
                .await?
                .ok_or_else(|| anyhow::anyhow!("invalid username or password"))?;
            let token = state.registry.mint(user.id, token_type).await?;
            println!(
                "Token created:\n  ID:    {}\n  Type:  {}\n  Value: {}",
                token.id, token.token_type, token.value
            );
        }
        cli::TokenCommands::Revoke { id } => {
            if state.registry.revoke(id).await? {
                println!("Token revoked.");
            } else {
                println!("Token not found.");
            }
        }
    }
    Ok(())
}

async fn handle_tag_command(cmd: cli::TagCommands, state: &AppState) -> anyhow::Result<()> {
    match cmd {
        cli::TagCommands::Add { name } => {
            let tag = state.todos.add_tag(&name).await?;
            println!("Tag created:\n  Name: {}\n  ID:   {}", tag.name, tag.id);
        }
    }
    Ok(())
}
