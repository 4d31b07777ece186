use genhpp::ai::{DisabledGenerator, GeminiClient, TextGenerator};
use genhpp::{AppState, config::Config, create_router};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DB_BUSY_TIMEOUT_SECS: u64 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("genhpp=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;
    config.print_info();

    // database file is created on first start; WAL lets readers run beside the writer
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(DB_BUSY_TIMEOUT_SECS));
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database ready, migrations applied");

    let ai: Arc<dyn TextGenerator> = match &config.gemini_api_key {
        Some(key) => Arc::new(GeminiClient::new(
            key.clone(),
            config.gemini_model.clone(),
            Duration::from_secs(config.ai_timeout_secs),
        )?),
        None => {
            warn!("AI flows disabled, the coach will answer with its fallback message");
            Arc::new(DisabledGenerator)
        }
    };

    let state = Arc::new(
        AppState::new(pool, config.jwt_secret.clone(), ai)
            .with_admin_emails(config.admin_emails.clone()),
    );
    let app = create_router(state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
